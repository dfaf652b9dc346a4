//! Built-in preprocessor table.

use super::{Category, EngineCommand, PreprocessorDescriptor};

pub const BUILTIN: &[PreprocessorDescriptor] = &[
    // Markup
    PreprocessorDescriptor {
        name: "pug-cli",
        category: Category::Markup,
        source_extensions: &["pug", "jade"],
        command: EngineCommand {
            bin: "pug",
            args: &["--path", "{filename}"],
        },
    },
    PreprocessorDescriptor {
        name: "marked",
        category: Category::Markup,
        source_extensions: &["md", "markdown"],
        command: EngineCommand {
            bin: "marked",
            args: &[],
        },
    },
    // Style
    PreprocessorDescriptor {
        name: "sass",
        category: Category::Style,
        source_extensions: &["scss"],
        command: EngineCommand {
            bin: "sass",
            args: &["--stdin", "--load-path={dir}"],
        },
    },
    PreprocessorDescriptor {
        name: "less",
        category: Category::Style,
        source_extensions: &["less"],
        command: EngineCommand {
            bin: "lessc",
            args: &["--include-path={dir}", "-"],
        },
    },
    PreprocessorDescriptor {
        name: "stylus",
        category: Category::Style,
        source_extensions: &["styl", "stylus"],
        command: EngineCommand {
            bin: "stylus",
            args: &["--include", "{dir}"],
        },
    },
    // Script
    PreprocessorDescriptor {
        name: "coffeescript",
        category: Category::Script,
        source_extensions: &["coffee"],
        command: EngineCommand {
            bin: "coffee",
            args: &["--stdio", "--print", "--compile"],
        },
    },
    PreprocessorDescriptor {
        name: "esbuild",
        category: Category::Script,
        source_extensions: &["ts", "tsx", "jsx"],
        command: EngineCommand {
            bin: "esbuild",
            args: &["--loader={ext}", "--sourcefile={filename}"],
        },
    },
];
