//! Function registry exposed to every fragment.
//!
//! Functions are plain Handlebars helpers. The registry is consumed when the manager is built
//! and cannot change afterwards; every render namespace sees the same set.
//!
//! ```ignore
//! use handlebars::handlebars_helper;
//! use tmplview_core::funcs::Funcs;
//!
//! handlebars_helper!(shout: |s: str| s.to_uppercase());
//! let funcs = Funcs::new().helper("shout", Box::new(shout));
//! ```

use std::fmt;

use handlebars::{Handlebars, HelperDef};

type BoxedHelper = Box<dyn HelperDef + Send + Sync>;

#[derive(Default)]
pub struct Funcs {
    helpers: Vec<(String, BoxedHelper)>,
}

impl Funcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a helper under `name`. A later registration with the same name wins.
    pub fn helper(mut self, name: impl Into<String>, def: BoxedHelper) -> Self {
        self.helpers.push((name.into(), def));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.helpers.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn install(self, hbs: &mut Handlebars<'static>) {
        for (name, def) in self.helpers {
            hbs.register_helper(&name, def);
        }
    }
}

impl fmt::Debug for Funcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
