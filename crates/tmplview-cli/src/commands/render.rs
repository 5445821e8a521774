use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use tmplview_core::config::ManagerConfig;
use tmplview_core::loader::FsLoader;
use tmplview_core::Manager;

use crate::helpers;
use crate::output;

/// Render one view, optionally inside a layout.
///
/// Output goes to stdout unless `output_path` is set. The file is only created once the view
/// rendered successfully.
pub fn run(
    config: &ManagerConfig,
    path: &str,
    layout: Option<&str>,
    data_path: Option<&Path>,
    output_path: Option<&Path>,
) -> Result<()> {
    let data = super::load_data(data_path)?;
    let manager = Manager::from_config(config, Arc::new(FsLoader), helpers::funcs());
    tracing::debug!(
        base_path = %manager.base_path().display(),
        caching = manager.is_caching(),
        view = path,
        layout = layout.unwrap_or("-"),
        "rendering view"
    );

    match output_path {
        None => {
            let stdout = io::stdout().lock();
            match layout {
                Some(layout) => manager.render_in_layout(stdout, path, layout, &data)?,
                None => manager.render(stdout, path, &data)?,
            }
        }
        Some(output_path) => {
            let rendered = match layout {
                Some(layout) => manager.render_in_layout_to_string(path, layout, &data)?,
                None => manager.render_to_string(path, &data)?,
            };
            let mut file = std::fs::File::create(output_path)
                .with_context(|| format!("failed to create {}", output_path.display()))?;
            file.write_all(rendered.as_bytes())?;
            output::print_success(&format!("Wrote {}", output_path.display()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("views/layouts")).unwrap();
        std::fs::write(dir.path().join("views/hello.html"), "<p>{{upper name}}</p>").unwrap();
        std::fs::write(
            dir.path().join("views/layouts/app.html"),
            "<body>{{> @content}}</body>",
        )
        .unwrap();
        std::fs::write(dir.path().join("data.json"), r#"{ "name": "ada" }"#).unwrap();
        dir
    }

    #[test]
    fn test_render_to_file() {
        let dir = setup();
        let config = ManagerConfig {
            base_path: dir.path().join("views"),
            ..ManagerConfig::default()
        };
        let out = dir.path().join("out.html");

        run(
            &config,
            "hello.html",
            Some("layouts/app.html"),
            Some(&dir.path().join("data.json")),
            Some(&out),
        )
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "<body><p>ADA</p></body>"
        );
    }

    #[test]
    fn test_failed_render_creates_no_file() {
        let dir = setup();
        let config = ManagerConfig {
            base_path: dir.path().join("views"),
            ..ManagerConfig::default()
        };
        let out = dir.path().join("out.html");

        assert!(run(&config, "missing.html", None, None, Some(&out)).is_err());
        assert!(!out.exists());
    }
}
