//! Render options and capability flags.
//!
//! [`RenderOptions`] is the whole configuration of one render call. It is
//! built with a consuming builder:
//!
//! ```rust
//! use quire::RenderOptions;
//!
//! let options = RenderOptions::new(r#"{"name": "World"}"#)
//!     .overwrite("name=Reader")
//!     .template_inline("Hello {{ name }}!")
//!     .allow_io(true);
//!
//! assert_eq!(quire::render_to_string(&options).unwrap(), "Hello Reader!");
//! ```

use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult};
use minijinja::Value;

use crate::error::Error;
use crate::functions::FunctionRegistry;

/// A single capability a template may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Run external commands. Implies [`Capability::Io`] and [`Capability::Network`].
    Exec,
    /// Read and write files, inspect the environment.
    Io,
    /// Talk to the network.
    Network,
}

/// The set of capabilities granted to templates.
///
/// Granting [`Capability::Exec`] grants every capability: a template that can
/// run commands can do anything those commands can.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    bits: u8,
}

impl Capabilities {
    const EXEC: u8 = 0b001;
    const IO: u8 = 0b010;
    const NETWORK: u8 = 0b100;

    /// No capabilities: only pure helpers are available.
    pub const NONE: Capabilities = Capabilities { bits: 0 };

    /// Every capability.
    pub const ALL: Capabilities = Capabilities {
        bits: Self::EXEC | Self::IO | Self::NETWORK,
    };

    /// Builds a capability set from the three independent flags.
    pub fn new(exec: bool, io: bool, network: bool) -> Self {
        let mut caps = Self::NONE;
        if exec {
            caps = caps.grant(Capability::Exec);
        }
        if io {
            caps = caps.grant(Capability::Io);
        }
        if network {
            caps = caps.grant(Capability::Network);
        }
        caps
    }

    /// Returns a copy with `capability` granted.
    pub fn grant(self, capability: Capability) -> Self {
        let bits = match capability {
            Capability::Exec => Self::EXEC | Self::IO | Self::NETWORK,
            Capability::Io => Self::IO,
            Capability::Network => Self::NETWORK,
        };
        Self {
            bits: self.bits | bits,
        }
    }

    pub fn allows(self, capability: Capability) -> bool {
        let bit = match capability {
            Capability::Exec => Self::EXEC,
            Capability::Io => Self::IO,
            Capability::Network => Self::NETWORK,
        };
        self.bits & bit != 0
    }

    pub fn allows_exec(self) -> bool {
        self.allows(Capability::Exec)
    }

    pub fn allows_io(self) -> bool {
        self.allows(Capability::Io)
    }

    pub fn allows_network(self) -> bool {
        self.allows(Capability::Network)
    }
}

/// Where the template text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource<'a> {
    /// A file path, itself evaluated as a template before reading.
    File(&'a str),
    /// Template text given directly.
    Inline(&'a str),
}

/// Options for one render call.
///
/// Exactly one of [`template_file`](Self::template_file) and
/// [`template_inline`](Self::template_inline) must be set; this is checked
/// when rendering, not when building.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    input: String,
    overwrites: Vec<String>,
    template_file: String,
    template_inline: String,
    output: String,
    capabilities: Capabilities,
    strict: bool,
    functions: FunctionRegistry,
}

impl RenderOptions {
    /// Creates options reading from `input`: inline JSON if it starts with `{`,
    /// a file path otherwise.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Appends one `path=value` overwrite directive.
    pub fn overwrite(mut self, directive: impl Into<String>) -> Self {
        self.overwrites.push(directive.into());
        self
    }

    /// Appends several overwrite directives, in order.
    pub fn overwrites<I, S>(mut self, directives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overwrites
            .extend(directives.into_iter().map(Into::into));
        self
    }

    /// Sets the template file path (a template itself).
    pub fn template_file(mut self, path: impl Into<String>) -> Self {
        self.template_file = path.into();
        self
    }

    /// Sets the inline template text.
    pub fn template_inline(mut self, text: impl Into<String>) -> Self {
        self.template_inline = text.into();
        self
    }

    /// Sets the output path template. Empty means standard output.
    pub fn output(mut self, path: impl Into<String>) -> Self {
        self.output = path.into();
        self
    }

    pub fn allow_exec(mut self, allow: bool) -> Self {
        if allow {
            self.capabilities = self.capabilities.grant(Capability::Exec);
        }
        self
    }

    pub fn allow_io(mut self, allow: bool) -> Self {
        if allow {
            self.capabilities = self.capabilities.grant(Capability::Io);
        }
        self
    }

    pub fn allow_network(mut self, allow: bool) -> Self {
        if allow {
            self.capabilities = self.capabilities.grant(Capability::Network);
        }
        self
    }

    /// Replaces the capability set wholesale.
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Makes undefined values an error instead of rendering as empty.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Registers a custom helper. Custom helpers override built-in helpers of
    /// the same name, but not the inclusion helpers.
    pub fn function<F, Rv, Args>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.functions.insert(name, Value::from_function(f));
        self
    }

    /// Registers a custom helper given as an already callable value.
    pub fn function_value(mut self, name: impl Into<String>, f: Value) -> Self {
        self.functions.insert(name, f);
        self
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn overwrite_directives(&self) -> &[String] {
        &self.overwrites
    }

    pub fn output_path(&self) -> &str {
        &self.output
    }

    pub fn granted(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn custom_functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Returns the single configured template source.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if both or neither template sources are set.
    pub fn template_source(&self) -> Result<TemplateSource<'_>, Error> {
        match (self.template_file.is_empty(), self.template_inline.is_empty()) {
            (false, false) => Err(Error::Config(
                "both a template file and an inline template are set, pick one".into(),
            )),
            (true, true) => Err(Error::Config(
                "neither a template file nor an inline template is set, set one".into(),
            )),
            (false, true) => Ok(TemplateSource::File(&self.template_file)),
            (true, false) => Ok(TemplateSource::Inline(&self.template_inline)),
        }
    }
}
