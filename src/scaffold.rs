//! Starter project generation for `pen create`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::project::ProjectConfigService;
use crate::registry::{Category, Registry};

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("{path} already exists and is not an empty directory")]
    NotEmpty { path: PathBuf },

    #[error("Cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One file of a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldFile {
    pub name: String,
    pub category: Category,
    pub contents: &'static str,
}

/// Files for a new project, one per category, using each category's default
/// preprocessor. Categories without a default get plain html/css/js.
pub fn plan(registry: &Registry, config: &ProjectConfigService) -> Vec<ScaffoldFile> {
    Category::ALL
        .iter()
        .map(|&category| {
            let extension = config
                .default_for(category)
                .name()
                .and_then(|name| registry.descriptor_for(name).ok())
                .map(|d| d.canonical_extension())
                .unwrap_or_else(|| category.output_extension());

            ScaffoldFile {
                name: format!("{}.{extension}", stem(category)),
                category,
                contents: starter(extension),
            }
        })
        .collect()
}

/// Write `files` into `dir`, which must be missing or empty.
pub async fn create(dir: &Path, files: &[ScaffoldFile]) -> Result<Vec<PathBuf>, ScaffoldError> {
    if !is_missing_or_empty(dir).await {
        return Err(ScaffoldError::NotEmpty {
            path: dir.to_path_buf(),
        });
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ScaffoldError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.name);
        tokio::fs::write(&path, file.contents)
            .await
            .map_err(|source| ScaffoldError::Write {
                path: path.clone(),
                source,
            })?;
        crate::debug_event!("scaffold", "wrote", "{}", path.display());
        written.push(path);
    }

    Ok(written)
}

async fn is_missing_or_empty(dir: &Path) -> bool {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(None)),
        Err(e) => e.kind() == std::io::ErrorKind::NotFound,
    }
}

fn stem(category: Category) -> &'static str {
    match category {
        Category::Markup => "index",
        Category::Style => "style",
        Category::Script => "script",
    }
}

fn starter(extension: &str) -> &'static str {
    match extension {
        "html" => {
            "<!doctype html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    <title>New pen</title>\n    <link rel=\"stylesheet\" href=\"style.css\">\n  </head>\n  <body>\n    <h1>New pen</h1>\n    <script src=\"script.js\"></script>\n  </body>\n</html>\n"
        }
        "pug" | "jade" => {
            "doctype html\nhtml\n  head\n    meta(charset=\"utf-8\")\n    title New pen\n    link(rel=\"stylesheet\", href=\"style.css\")\n  body\n    h1 New pen\n    script(src=\"script.js\")\n"
        }
        "md" | "markdown" => "# New pen\n\nEdit this file and save to see it rebuilt.\n",
        "css" => "body {\n  font-family: sans-serif;\n  color: #1f2937;\n}\n",
        "scss" => "$text: #1f2937;\n\nbody {\n  font-family: sans-serif;\n  color: $text;\n}\n",
        "less" => "@text: #1f2937;\n\nbody {\n  font-family: sans-serif;\n  color: @text;\n}\n",
        "styl" | "stylus" => "text = #1f2937\n\nbody\n  font-family sans-serif\n  color text\n",
        "js" => "console.log('Hello from pen');\n",
        "coffee" => "console.log 'Hello from pen'\n",
        "ts" => "const greeting: string = 'Hello from pen';\nconsole.log(greeting);\n",
        "tsx" | "jsx" => "const App = () => <h1>Hello from pen</h1>;\n\nexport default App;\n",
        _ => "",
    }
}
