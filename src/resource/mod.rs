//! Device objects as declarative resources
//!
//! [`PanResource`] lets any [`panos::PanObject`] take part in
//! [`declarative::apply_state`], and [`XmlApiStore`] carries out the
//! resulting create/update/delete against one scope of a device.

mod pan_object;

pub use pan_object::{PanResource, XmlApiStore};
