//! Trellis - a retained-mode widget toolkit.
//!
//! This is the main crate: the widget tree, layout, event dispatch,
//! animations, the standard widgets and the window driver. Attribute
//! machinery and values come from `trellis-core` and are re-exported here.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut window = Window::with_attrs(UiConfig::default(), attrs! { "w" => 320, "h" => 200 }).unwrap();
//! let ui = window.ui_mut();
//! let column = ui.spawn(VBox, attrs! { "spacing" => 4 }).unwrap();
//! let name = ui.spawn(Entry::new(), attrs! { "placeholder" => "Name" }).unwrap();
//! let volume = ui.spawn(Slider::new(), attrs! { "value" => 30 }).unwrap();
//! ui.add(column, name, Cell::new().fill(true, false)).unwrap();
//! ui.add(column, volume, Cell::new().fill(true, false)).unwrap();
//! window.add(column, Cell::new()).unwrap();
//!
//! let mut canvas = RecordingCanvas::new();
//! window.update(0.0, &InputState::default(), &mut canvas);
//! assert_eq!(canvas.frames(), 1);
//! ```

pub mod config;
pub mod error;
pub mod prelude;
pub mod widget;
pub mod window;

pub use trellis_core::{attribute, color, logging};
pub use trellis_core::{
    Assign, AttrMap, AttributeError, AttributeResult, AttributeSpec, AttributeTable, Color, Reflow, Sides,
    Value, ValueType,
};

pub use config::UiConfig;
pub use error::{TreeError, TreeResult};
pub use widget::{Ui, Widget, WidgetId};
pub use window::Window;

#[cfg(test)]
pub(crate) mod test_logging {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::EnvFilter;

    /// Install a global subscriber filtered by `RUST_LOG` that writes through
    /// the test harness. Later calls are no-ops.
    pub(crate) fn init() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a subscriber filtered by `filter` and return what it
    /// logged.
    pub(crate) fn capture(filter: &str, f: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }
}

/// Build an [`AttrMap`] from `name => value` pairs.
///
/// Values go through [`Value::from`], so numbers, strings, booleans and
/// arrays can be written directly.
///
/// ```
/// use trellis::{attrs, Value};
///
/// let map = attrs! { "label" => "OK", "w" => 80, "padding" => [2, 4] };
/// assert_eq!(map["w"], Value::Number(80.0));
/// assert!(attrs! {}.is_empty());
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::AttrMap::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::AttrMap::new();
        $(
            map.insert(::std::string::String::from($name), $crate::Value::from($value));
        )+
        map
    }};
}

static_assertions::assert_impl_all!(WidgetId: Send, Sync, Copy);
static_assertions::assert_impl_all!(UiConfig: Send, Sync, Clone);
