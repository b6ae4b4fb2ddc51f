//! # Pipeline
//!
//! Parse, transform, stringify. A [`Pipeline`] owns one [`Stringifier`]
//! (and so one handler table) plus an ordered list of [`Plugin`]s.
//!
//! Installing a plugin calls [`Plugin::attach`] once, which is where a
//! plugin registers its render handlers. Every [`Pipeline::run`] then calls
//! each plugin's [`Plugin::transform`] in installation order.

use serde::{Deserialize, Serialize};

use crate::{
    anchor::AnchorPlugin,
    ast::Node,
    attributes::AttributesPlugin,
    parsing::{self, ParseOptions},
    stringify::{Handlers, Stringifier, StringifyError, StringifyOptions},
};

/// A tree transform, optionally with render handlers of its own.
pub trait Plugin {
    /// Unique name; a pipeline installs each name at most once.
    fn name(&self) -> &'static str;

    /// Registers render handlers. Called once, when the plugin is installed.
    fn attach(&self, _handlers: &mut Handlers) {}

    /// Rewrites the tree parsed from `source` in place.
    fn transform(&self, root: &mut Node, source: &str);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub parse: ParseOptions,
    pub stringify: StringifyOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to stringify document: {0}")]
    Stringify(#[from] StringifyError),
}

pub struct Pipeline {
    parse: ParseOptions,
    stringifier: Stringifier,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// Creates a pipeline with no plugins installed.
    pub fn new(options: PipelineOptions) -> Result<Self, PipelineError> {
        options.stringify.validate()?;
        Ok(Self {
            parse: options.parse,
            stringifier: Stringifier::new(options.stringify),
            plugins: Vec::new(),
        })
    }

    /// Default options with attribute resolution and anchors installed.
    pub fn with_defaults() -> Self {
        Self {
            parse: ParseOptions::default(),
            stringifier: Stringifier::default(),
            plugins: Vec::new(),
        }
        .with_default_plugins()
    }

    /// Installs [`AttributesPlugin`] then [`AnchorPlugin`].
    #[must_use]
    pub fn with_default_plugins(mut self) -> Self {
        self.use_plugin(Box::new(AttributesPlugin));
        self.use_plugin(Box::new(AnchorPlugin));
        self
    }

    /// Attaches `plugin` and appends it to the transform order. A plugin
    /// whose name is already installed is ignored.
    pub fn use_plugin(&mut self, plugin: Box<dyn Plugin>) -> &mut Self {
        let name = plugin.name();
        if self.plugins.iter().any(|p| p.name() == name) {
            log::debug!("plugin `{name}` already installed");
            return self;
        }
        plugin.attach(self.stringifier.handlers_mut());
        log::debug!("installed plugin `{name}`");
        self.plugins.push(plugin);
        self
    }

    /// Names of the installed plugins, in transform order.
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn handlers(&self) -> &Handlers {
        self.stringifier.handlers()
    }

    pub fn parse(&self, source: &str) -> Node {
        parsing::parse(source, self.parse)
    }

    /// Runs every plugin's transform over `root`, parsed from `source`, in
    /// order.
    pub fn run(&self, root: &mut Node, source: &str) {
        for plugin in &self.plugins {
            log::trace!("running `{}`", plugin.name());
            plugin.transform(root, source);
        }
    }

    pub fn stringify(&self, root: &Node) -> Result<String, PipelineError> {
        Ok(self.stringifier.stringify(root)?)
    }

    /// Parses `source`, runs the transforms and renders the result.
    pub fn process(&self, source: &str) -> Result<String, PipelineError> {
        let mut root = self.parse(source);
        self.run(&mut root, source);
        self.stringify(&root)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}
