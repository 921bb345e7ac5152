//! PAN-OS objects behind the declarative traits

use anyhow::Result;
use declarative::{Resource, Store};
use panos::{PanObject, Scope, XmlApi};
use std::fmt;

/// A configuration object that can be declared present or absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanResource<O>(pub O);

impl<O: PanObject + fmt::Debug> Resource for PanResource<O> {
    fn id(&self) -> &str {
        self.0.name()
    }

    fn resource_type(&self) -> &'static str {
        O::ROOT
    }

    fn same_as(&self, other: &Self) -> bool {
        self.0.equal(&other.0)
    }

    fn details(&self) -> Option<String> {
        Some(self.0.summary())
    }
}

/// Writes objects into one scope of the candidate config
pub struct XmlApiStore<'a, A: XmlApi + ?Sized> {
    api: &'a A,
    scope: &'a Scope,
}

impl<'a, A: XmlApi + ?Sized> XmlApiStore<'a, A> {
    pub fn new(api: &'a A, scope: &'a Scope) -> Self {
        Self { api, scope }
    }
}

impl<O, A> Store<PanResource<O>> for XmlApiStore<'_, A>
where
    O: PanObject + fmt::Debug,
    A: XmlApi + ?Sized,
{
    fn create(&mut self, desired: &PanResource<O>) -> Result<()> {
        panos::create(self.api, self.scope, &desired.0)?;
        Ok(())
    }

    fn update(&mut self, desired: &PanResource<O>, _current: &PanResource<O>) -> Result<()> {
        panos::edit(self.api, self.scope, &desired.0)?;
        Ok(())
    }

    fn delete(&mut self, current: &PanResource<O>) -> Result<()> {
        panos::delete::<O, _>(self.api, self.scope, current.0.name())?;
        Ok(())
    }
}
