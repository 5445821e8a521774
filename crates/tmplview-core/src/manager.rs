//! The view manager: load, parse, cache and compose template fragments.
//!
//! Every render builds a fresh Handlebars registry (the *namespace*) holding the shared helpers
//! plus one or two fragments bound to reserved names:
//!
//! | name       | bound to                         | root of            |
//! |------------|----------------------------------|--------------------|
//! | `@content` | the content fragment             | [`Manager::render`] |
//! | `@layout`  | the layout fragment              | [`Manager::render_in_layout`] |
//!
//! A layout pulls the content in with the partial syntax `{{> @content}}`. Included content is
//! inserted verbatim: a partial alone on its line keeps its own leading whitespace, but the
//! content's later lines are not re-indented. Standalone rules still drop the line break after
//! such a partial, so a content fragment ending in a newline supplies it.
//!
//! A fragment may not include itself, and content may not include the layout it is rendered in.
//! Both are rejected with [`TmplviewError::RecursiveInclude`] before rendering starts.
//!
//! Output is rendered into a buffer first and only written to the sink once rendering
//! succeeded, so a failed call never leaves partial output behind.
//!
//! ## Caching
//!
//! With caching enabled, the compiled tree of each logical path is kept for the manager's
//! lifetime and shared by every later call; the loader is not consulted again for that path.
//! Caching is fixed at construction and cannot be toggled.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use crate::cache::{Tree, TreeCache};
use crate::config::ManagerConfig;
use crate::error::{Result, TmplviewError};
use crate::fragment::Fragment;
use crate::funcs::Funcs;
use crate::loader::Loader;
use crate::path;

/// Reserved name of the content fragment.
pub const CONTENT: &str = "@content";
/// Reserved name of the layout fragment.
pub const LAYOUT: &str = "@layout";

/// Loads, parses, caches and renders templates. Share it behind an [`Arc`] across threads.
pub struct Manager {
    base_path: PathBuf,
    loader: Arc<dyn Loader>,
    /// Helpers and engine settings; cloned into every render namespace. Holds no templates.
    base: Handlebars<'static>,
    cache: Option<TreeCache>,
}

/// Builder for [`Manager`]. Obtain one with [`Manager::builder`].
pub struct ManagerBuilder {
    base_path: PathBuf,
    loader: Arc<dyn Loader>,
    caching: bool,
    strict_mode: bool,
    funcs: Funcs,
}

impl ManagerBuilder {
    /// Keep compiled fragments for the manager's lifetime (default off).
    pub fn caching(mut self, enabled: bool) -> Self {
        self.caching = enabled;
        self
    }

    /// Strict mode (default on) turns references to missing fields into render errors.
    pub fn strict_mode(mut self, enabled: bool) -> Self {
        self.strict_mode = enabled;
        self
    }

    /// Helpers visible to every fragment. Replaces any set given earlier.
    pub fn funcs(mut self, funcs: Funcs) -> Self {
        self.funcs = funcs;
        self
    }

    /// Finish the manager. Performs no I/O; fragments are loaded on first use.
    pub fn build(self) -> Manager {
        debug!(
            base_path = %self.base_path.display(),
            caching = self.caching,
            strict_mode = self.strict_mode,
            helpers = ?self.funcs,
            "building template manager"
        );

        let mut base = Handlebars::new();
        base.set_strict_mode(self.strict_mode);
        base.set_prevent_indent(true);
        self.funcs.install(&mut base);

        Manager {
            base_path: self.base_path,
            loader: self.loader,
            base,
            cache: self.caching.then(TreeCache::new),
        }
    }
}

impl Manager {
    /// Manager with no helpers and strict mode on.
    pub fn new(base_path: impl Into<PathBuf>, loader: Arc<dyn Loader>, caching: bool) -> Self {
        Self::builder(base_path, loader).caching(caching).build()
    }

    /// Start configuring a manager that resolves paths against `base_path` and reads them
    /// through `loader`.
    pub fn builder(base_path: impl Into<PathBuf>, loader: Arc<dyn Loader>) -> ManagerBuilder {
        ManagerBuilder {
            base_path: base_path.into(),
            loader,
            caching: false,
            strict_mode: true,
            funcs: Funcs::new(),
        }
    }

    /// Manager configured from a loaded [`ManagerConfig`].
    pub fn from_config(config: &ManagerConfig, loader: Arc<dyn Loader>, funcs: Funcs) -> Self {
        Self::builder(config.base_path.clone(), loader)
            .caching(config.caching)
            .strict_mode(config.strict_mode)
            .funcs(funcs)
            .build()
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Number of cached fragments (always 0 when caching is disabled).
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, TreeCache::len)
    }

    /// Render the template at `path` into `sink`.
    pub fn render<W, T>(&self, sink: W, path: &str, data: &T) -> Result<()>
    where
        W: Write,
        T: Serialize,
    {
        let out = self.execute(&[(CONTENT, path)], CONTENT, data)?;
        flush(sink, &out)
    }

    /// Render `content_path` inside `layout_path`. The layout includes the content with
    /// `{{> @content}}`.
    pub fn render_in_layout<W, T>(
        &self,
        sink: W,
        content_path: &str,
        layout_path: &str,
        data: &T,
    ) -> Result<()>
    where
        W: Write,
        T: Serialize,
    {
        let out = self.execute(
            &[(LAYOUT, layout_path), (CONTENT, content_path)],
            LAYOUT,
            data,
        )?;
        flush(sink, &out)
    }

    /// Like [`Manager::render`], returning the output instead of writing it.
    pub fn render_to_string<T: Serialize>(&self, path: &str, data: &T) -> Result<String> {
        self.execute(&[(CONTENT, path)], CONTENT, data)
    }

    /// Like [`Manager::render_in_layout`], returning the output instead of writing it.
    pub fn render_in_layout_to_string<T: Serialize>(
        &self,
        content_path: &str,
        layout_path: &str,
        data: &T,
    ) -> Result<String> {
        self.execute(
            &[(LAYOUT, layout_path), (CONTENT, content_path)],
            LAYOUT,
            data,
        )
    }

    fn execute<T: Serialize>(
        &self,
        bindings: &[(&'static str, &str)],
        root: &'static str,
        data: &T,
    ) -> Result<String> {
        let namespace = self.namespace(bindings, root)?;
        namespace
            .render(root, data)
            .map_err(|source| TmplviewError::Execution { root, source })
    }

    /// Build a fresh namespace, resolving bindings in order. The first failure aborts.
    ///
    /// `root` is the name rendering starts from; no bound fragment may include it, and none may
    /// include its own name.
    fn namespace(
        &self,
        bindings: &[(&'static str, &str)],
        root: &'static str,
    ) -> Result<Handlebars<'static>> {
        let mut namespace = self.base.clone();
        for &(name, logical) in bindings {
            let (key, tree) = self.fragment(logical)?;
            check_includes(&key, name, root, &tree)?;
            namespace.register_template(name, tree.template().clone());
        }
        Ok(namespace)
    }

    /// Return the normalized key and compiled fragment for `logical`, from the cache or via
    /// loader + parse.
    fn fragment(&self, logical: &str) -> Result<(String, Tree)> {
        let path::Resolved { key, physical } = path::resolve(&self.base_path, logical)?;

        if let Some(tree) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            debug!(path = %key, "template cache hit");
            return Ok((key, tree));
        }

        debug!(path = %key, physical = %physical.display(), "loading template");

        let bytes = self.loader.load(&physical).map_err(|source| TmplviewError::Load {
            path: key.clone(),
            physical,
            source,
        })?;
        let tree = Arc::new(Fragment::compile(&key, bytes)?);

        if let Some(cache) = &self.cache {
            cache.insert(key.clone(), Arc::clone(&tree));
        }
        Ok((key, tree))
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("base_path", &self.base_path)
            .field("caching", &self.is_caching())
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}

fn check_includes(
    path: &str,
    name: &'static str,
    root: &'static str,
    fragment: &Fragment,
) -> Result<()> {
    for includes in [name, root] {
        if fragment.includes(includes) {
            return Err(TmplviewError::RecursiveInclude {
                path: path.to_string(),
                name,
                includes,
            });
        }
    }
    Ok(())
}

fn flush<W: Write>(mut sink: W, out: &str) -> Result<()> {
    sink.write_all(out.as_bytes()).map_err(TmplviewError::Write)?;
    sink.flush().map_err(TmplviewError::Write)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{CountingLoader, MemoryLoader};
    use serde_json::json;

    fn loader() -> Arc<CountingLoader<MemoryLoader>> {
        Arc::new(CountingLoader::new(
            MemoryLoader::new()
                .with_file("views/pages/hello.html", "<p>Hello!</p>")
                .with_file("views/pages/name.html", "<p>{{name}}</p>")
                .with_file("views/layouts/main.html", "<main>{{> @content}}</main>")
                .with_file("views/broken.html", "{{#if}}")
                .with_file("views/pages/loop.html", "x{{> @content}}")
                .with_file("views/pages/up.html", "x{{> @layout}}")
                .with_file("views/layouts/self.html", "<div>{{> @layout}}</div>"),
        ))
    }

    #[test]
    fn test_no_io_at_construction() {
        let counter = loader();
        let manager = Manager::new("views", counter.clone(), true);
        assert_eq!(counter.calls(), 0);
        assert!(manager.is_caching());
        assert_eq!(manager.cached_len(), 0);
    }

    #[test]
    fn test_render_literal() {
        let manager = Manager::new("views", loader(), false);
        let out = manager.render_to_string("pages/hello.html", &json!({})).unwrap();
        assert_eq!(out, "<p>Hello!</p>");
    }

    #[test]
    fn test_render_escapes_html() {
        let manager = Manager::new("views", loader(), false);
        let out = manager
            .render_to_string("pages/name.html", &json!({ "name": "<b>" }))
            .unwrap();
        assert_eq!(out, "<p>&lt;b&gt;</p>");
    }

    #[test]
    fn test_render_in_layout_inlines_content() {
        let manager = Manager::new("views", loader(), false);
        let out = manager
            .render_in_layout_to_string("pages/name.html", "layouts/main.html", &json!({ "name": "Ada" }))
            .unwrap();
        assert_eq!(out, "<main><p>Ada</p></main>");
    }

    #[test]
    fn test_cache_key_is_normalized() {
        let counter = loader();
        let manager = Manager::new("views", counter.clone(), true);
        manager.render_to_string("pages/hello.html", &json!({})).unwrap();
        manager.render_to_string("./pages//hello.html", &json!({})).unwrap();
        assert_eq!(counter.calls(), 1);
        assert_eq!(manager.cached_len(), 1);
    }

    #[test]
    fn test_uncached_manager_never_caches() {
        let manager = Manager::new("views", loader(), false);
        manager.render_to_string("pages/hello.html", &json!({})).unwrap();
        assert_eq!(manager.cached_len(), 0);
    }

    #[test]
    fn test_layout_resolved_before_content() {
        let counter = loader();
        let manager = Manager::new("views", counter.clone(), true);
        let err = manager
            .render_in_layout_to_string("pages/missing.html", "layouts/missing.html", &json!({}))
            .unwrap_err();
        assert_eq!(err.logical_path(), Some("layouts/missing.html"));
        assert_eq!(counter.calls(), 1);
    }

    #[test]
    fn test_parse_error_is_not_cached() {
        let counter = loader();
        let manager = Manager::new("views", counter.clone(), true);
        for _ in 0..2 {
            let err = manager.render_to_string("broken.html", &json!({})).unwrap_err();
            assert!(matches!(err, TmplviewError::Parse { .. }));
        }
        assert_eq!(counter.calls(), 2);
        assert_eq!(manager.cached_len(), 0);
    }

    #[test]
    fn test_non_utf8_source_is_parse_error() {
        let loader = MemoryLoader::new().with_file("views/bin.html", vec![0xff, 0xfe]);
        let manager = Manager::new("views", Arc::new(loader), false);
        let err = manager.render_to_string("bin.html", &json!({})).unwrap_err();
        assert!(matches!(err, TmplviewError::Parse { ref path, .. } if path == "bin.html"));
    }

    #[test]
    fn test_strict_mode_missing_field() {
        let manager = Manager::new("views", loader(), false);
        let err = manager.render_to_string("pages/name.html", &json!({})).unwrap_err();
        assert!(matches!(err, TmplviewError::Execution { root: CONTENT, .. }));
    }

    #[test]
    fn test_lenient_mode_missing_field_renders_empty() {
        let manager = Manager::builder("views", loader()).strict_mode(false).build();
        let out = manager.render_to_string("pages/name.html", &json!({})).unwrap();
        assert_eq!(out, "<p></p>");
    }

    #[test]
    fn test_from_config() {
        let config = ManagerConfig {
            base_path: PathBuf::from("views"),
            caching: true,
            strict_mode: true,
        };
        let manager = Manager::from_config(&config, loader(), Funcs::new());
        assert!(manager.is_caching());
        assert_eq!(manager.base_path(), Path::new("views"));
    }

    #[test]
    fn test_self_including_content_rejected() {
        let manager = Manager::new("views", loader(), false);
        let err = manager.render_to_string("pages/loop.html", &json!({})).unwrap_err();
        match err {
            TmplviewError::RecursiveInclude { path, name, includes } => {
                assert_eq!(path, "pages/loop.html");
                assert_eq!(name, CONTENT);
                assert_eq!(includes, CONTENT);
            }
            other => panic!("expected recursive include, got {other:?}"),
        }
    }

    #[test]
    fn test_content_including_layout_rejected() {
        let manager = Manager::new("views", loader(), true);
        let err = manager
            .render_in_layout_to_string("pages/up.html", "layouts/main.html", &json!({}))
            .unwrap_err();
        assert!(matches!(
            err,
            TmplviewError::RecursiveInclude { name: CONTENT, includes: LAYOUT, .. }
        ));
        assert_eq!(err.logical_path(), Some("pages/up.html"));
    }

    #[test]
    fn test_self_including_layout_rejected() {
        let manager = Manager::new("views", loader(), false);
        let err = manager
            .render_in_layout_to_string("pages/hello.html", "layouts/self.html", &json!({}))
            .unwrap_err();
        assert!(matches!(
            err,
            TmplviewError::RecursiveInclude { name: LAYOUT, includes: LAYOUT, .. }
        ));
    }

    #[test]
    fn test_unbound_layout_reference_is_not_recursive() {
        let manager = Manager::new("views", loader(), false);
        let err = manager.render_to_string("pages/up.html", &json!({})).unwrap_err();
        assert!(matches!(err, TmplviewError::Execution { .. }));
    }

    #[test]
    fn test_standalone_content_is_not_reindented() {
        let loader = MemoryLoader::new()
            .with_file("views/layout.html", "<div>\n  {{> @content}}\n</div>\n")
            .with_file("views/content.html", "<p>a</p>\n<p>b</p>\n");
        let manager = Manager::new("views", Arc::new(loader), false);
        let out = manager
            .render_in_layout_to_string("content.html", "layout.html", &json!({}))
            .unwrap();
        assert_eq!(out, "<div>\n  <p>a</p>\n<p>b</p>\n</div>\n");
    }

    #[test]
    fn test_manager_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Manager>();
    }
}
