// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rendering directives attached to rules and to frame nodes.
//!
//! The engine never interprets these values. It only checks whether a key is
//! present (the "action" filter) and folds several bags together, later
//! bags overriding earlier ones key by key.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names of the directives an [`Effects`] bag can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKey {
    Hidden,
    Collapse,
    Header,
    Label,
    Color,
    Size,
    Width,
    MinWidth,
    MaxWidth,
    Renderer,
    Args,
    Icon,
    Text,
    Style,
    Mode,
    Features,
}

impl EffectKey {
    pub const ALL: [EffectKey; 16] = [
        EffectKey::Hidden,
        EffectKey::Collapse,
        EffectKey::Header,
        EffectKey::Label,
        EffectKey::Color,
        EffectKey::Size,
        EffectKey::Width,
        EffectKey::MinWidth,
        EffectKey::MaxWidth,
        EffectKey::Renderer,
        EffectKey::Args,
        EffectKey::Icon,
        EffectKey::Text,
        EffectKey::Style,
        EffectKey::Mode,
        EffectKey::Features,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectKey::Hidden => "hidden",
            EffectKey::Collapse => "collapse",
            EffectKey::Header => "header",
            EffectKey::Label => "label",
            EffectKey::Color => "color",
            EffectKey::Size => "size",
            EffectKey::Width => "width",
            EffectKey::MinWidth => "minWidth",
            EffectKey::MaxWidth => "maxWidth",
            EffectKey::Renderer => "renderer",
            EffectKey::Args => "args",
            EffectKey::Icon => "icon",
            EffectKey::Text => "text",
            EffectKey::Style => "style",
            EffectKey::Mode => "mode",
            EffectKey::Features => "features",
        }
    }
}

impl fmt::Display for EffectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bag of optional rendering directives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effects {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// RGB or RGBA components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    /// Renderer-specific arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    pub fn collapse(mut self, collapse: bool) -> Self {
        self.collapse = Some(collapse);
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn color(mut self, color: impl Into<Vec<u8>>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn min_width(mut self, width: u32) -> Self {
        self.min_width = Some(width);
        self
    }

    pub fn max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    pub fn args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn icon(mut self, icon: Value) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = Some(features.into_iter().map(Into::into).collect());
        self
    }

    /// Whether this bag defines `key`.
    pub fn has(&self, key: EffectKey) -> bool {
        match key {
            EffectKey::Hidden => self.hidden.is_some(),
            EffectKey::Collapse => self.collapse.is_some(),
            EffectKey::Header => self.header.is_some(),
            EffectKey::Label => self.label.is_some(),
            EffectKey::Color => self.color.is_some(),
            EffectKey::Size => self.size.is_some(),
            EffectKey::Width => self.width.is_some(),
            EffectKey::MinWidth => self.min_width.is_some(),
            EffectKey::MaxWidth => self.max_width.is_some(),
            EffectKey::Renderer => self.renderer.is_some(),
            EffectKey::Args => self.args.is_some(),
            EffectKey::Icon => self.icon.is_some(),
            EffectKey::Text => self.text.is_some(),
            EffectKey::Style => self.style.is_some(),
            EffectKey::Mode => self.mode.is_some(),
            EffectKey::Features => self.features.is_some(),
        }
    }

    /// Keys defined by this bag, in declaration order.
    pub fn keys(&self) -> Vec<EffectKey> {
        EffectKey::ALL.into_iter().filter(|k| self.has(*k)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Overlay `other` onto `self`; keys set in `other` win.
    pub fn merge(&mut self, other: &Effects) {
        fn overlay<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        overlay(&mut self.hidden, &other.hidden);
        overlay(&mut self.collapse, &other.collapse);
        overlay(&mut self.header, &other.header);
        overlay(&mut self.label, &other.label);
        overlay(&mut self.color, &other.color);
        overlay(&mut self.size, &other.size);
        overlay(&mut self.width, &other.width);
        overlay(&mut self.min_width, &other.min_width);
        overlay(&mut self.max_width, &other.max_width);
        overlay(&mut self.renderer, &other.renderer);
        overlay(&mut self.args, &other.args);
        overlay(&mut self.icon, &other.icon);
        overlay(&mut self.text, &other.text);
        overlay(&mut self.style, &other.style);
        overlay(&mut self.mode, &other.mode);
        overlay(&mut self.features, &other.features);
    }

    /// Fold bags in order, later ones overriding earlier ones.
    pub fn fold<'a, I>(bags: I) -> Effects
    where
        I: IntoIterator<Item = &'a Effects>,
    {
        bags.into_iter().fold(Effects::new(), |mut acc, bag| {
            acc.merge(bag);
            acc
        })
    }
}
