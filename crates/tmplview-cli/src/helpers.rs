//! Helpers available to every template rendered by the CLI.

use handlebars::handlebars_helper;
use tmplview_core::funcs::Funcs;

handlebars_helper!(upper: |s: str| s.to_uppercase());
handlebars_helper!(lower: |s: str| s.to_lowercase());
// Use with triple braces (`{{{json x}}}`) to skip HTML escaping.
handlebars_helper!(json: |v: Json| serde_json::to_string(v).unwrap_or_default());

pub fn funcs() -> Funcs {
    Funcs::new()
        .helper("upper", Box::new(upper))
        .helper("lower", Box::new(lower))
        .helper("json", Box::new(json))
}
