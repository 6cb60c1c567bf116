//! Core systems for Trellis.
//!
//! This crate provides the widget-independent foundation of the Trellis
//! widget toolkit:
//!
//! - **Values**: the dynamic [`Value`] type attributes are stored as, with
//!   semantic coercion and interpolation
//! - **Attribute Registry**: per-class [`AttributeTable`]s with inheritance,
//!   field references, calculated values and shorthand fan-out
//! - **Colors**: parsing and luma for color-valued attributes
//! - **Logging**: `tracing` targets, performance spans and slow-operation
//!   warnings
//!
//! # Attribute Example
//!
//! ```
//! use trellis_core::attribute::{
//!     sides_getter, sides_shorthand, AttributeSpec, AttributeTable, Reflow,
//! };
//! use trellis_core::{AttrMap, Value};
//!
//! let table = AttributeTable::root("Widget", [(
//!     "padding",
//!     AttributeSpec::new()
//!         .shorthand(sides_shorthand)
//!         .getter(sides_getter)
//!         .reflow(Reflow::Full),
//! )])
//! .unwrap();
//!
//! let calc = table
//!     .calculate("padding", &Value::from([5, 10]), &AttrMap::new())
//!     .unwrap();
//! let mut map = AttrMap::new();
//! map.extend(calc.fields);
//! assert_eq!(map["lpadding"], Value::Number(10.0));
//! ```

pub mod attribute;
pub mod color;
pub mod error;
pub mod logging;
pub mod value;

pub use attribute::{
    AttributeDescriptor, AttributeSpec, AttributeTable, Calculated, EnumTable, Reflow, Sides,
    StepFn,
};
pub use color::Color;
pub use error::{AttributeError, AttributeResult};
pub use logging::{PerfSpan, SlowOpWatch};
pub use value::{Assign, AttrMap, Value, ValueType};

// Tables are shared across threads through `LazyLock` statics.
static_assertions::assert_impl_all!(AttributeTable: Send, Sync);
static_assertions::assert_impl_all!(Value: Send, Sync, Clone);
