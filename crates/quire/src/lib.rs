//! Data-driven text and HTML rendering.
//!
//! `quire` reads structured data (YAML, JSON, CSV or an inline JSON literal),
//! patches it with `path=value` overwrites, renders a [minijinja] template
//! against it and writes the result to a file or stdout. The template path
//! and the output path are templates themselves.
//!
//! # Quick Start
//!
//! ```rust
//! use quire::RenderOptions;
//!
//! let options = RenderOptions::new(r#"{"creator": {"name": "John Doe", "age": 54}}"#)
//!     .template_inline("Hello {{ creator.name }}, age {{ creator.age }}");
//!
//! assert_eq!(quire::render_to_string(&options).unwrap(), "Hello John Doe, age 54");
//! ```
//!
//! # Pipeline
//!
//! ```text
//! input descriptor ─► read_input ─► data tree
//!                                     │
//!        template path evaluated ◄────┤ (unpatched)
//!                                     ▼
//!                            apply_overwrites
//!                                     │
//!                                     ▼
//!                  render (HTML-escaped if output ends in .html)
//!                                     │
//!        output path evaluated ◄──────┘ (patched) ─► file or stdout
//! ```
//!
//! # Capabilities
//!
//! Templates get pure helpers only, unless the caller grants more with
//! [`RenderOptions::allow_io`], [`RenderOptions::allow_network`] or
//! [`RenderOptions::allow_exec`] (which implies the other two). See
//! [`functions`] for the full helper list.
//!
//! # Inclusion
//!
//! `inline(path)`, `inlineWithData(path, ...)`, `inlineIfExists(path)` and
//! `inlineIfExistsWithData(path, ...)` render another template file through
//! the same pipeline. `includeIO` is an alias of `inline`.

mod error;
pub mod functions;
mod include;
pub mod input;
mod options;
pub mod output;
pub mod overwrite;
mod pipeline;
pub mod render;
pub mod template;

pub use error::{BoxError, Error};
pub use functions::{build_registry, pure_functions, FunctionRegistry};
pub use input::{read_input, InputFormat};
pub use options::{Capabilities, Capability, RenderOptions, TemplateSource};
pub use output::{write_output, OutputDestination};
pub use overwrite::{apply_overwrites, Directive};
pub use pipeline::{render_to_file, render_to_string};
pub use render::{render_template, EscapeMode};
pub use template::{resolve_template, ResolvedTemplate};
