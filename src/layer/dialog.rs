use crate::foundation::error::LayersResult;
use crate::layer::core::LayerCx;
use crate::layer::delegate::LayerDelegate;
use crate::state::bundle::Bundle;

const DIALOG_STYLE: &str = "DIALOG_LAYER.PRIVATE_DIALOG_STYLE";
const DIALOG_THEME: &str = "DIALOG_LAYER.PRIVATE_DIALOG_THEME";
const DIALOG_CANCELABLE: &str = "DIALOG_LAYER.PRIVATE_DIALOG_CANCELABLE";

/// Window decoration of a dialog layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogStyle {
    /// Regular dialog.
    #[default]
    Normal,
    /// No title bar.
    NoTitle,
    /// No frame at all.
    NoFrame,
    /// No frame and no input.
    NoInput,
}

impl DialogStyle {
    fn to_raw(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::NoTitle => 1,
            Self::NoFrame => 2,
            Self::NoInput => 3,
        }
    }

    fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Normal),
            1 => Some(Self::NoTitle),
            2 => Some(Self::NoFrame),
            3 => Some(Self::NoInput),
            _ => None,
        }
    }
}

/// Theme used when a frameless style is picked without an explicit theme.
pub const PANEL_THEME: u32 = 1;

/// Makes a layer behave like a dialog: its view stays out of the stack container and is
/// presented as a detached window while the layer is attached.
///
/// Install it from [`Layer::install_delegates`](crate::Layer::install_delegates).
#[derive(Debug)]
pub struct DialogDelegate {
    style: DialogStyle,
    theme: u32,
    cancelable: bool,
    presented: bool,
}

impl Default for DialogDelegate {
    fn default() -> Self {
        Self {
            style: DialogStyle::Normal,
            theme: 0,
            cancelable: true,
            presented: false,
        }
    }
}

impl DialogDelegate {
    /// Cancelable dialog with the normal style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set style and theme. A zero theme with a frameless style selects [`PANEL_THEME`].
    pub fn set_style(&mut self, style: DialogStyle, theme: u32) {
        self.style = style;
        if theme != 0 {
            self.theme = theme;
        } else if matches!(style, DialogStyle::NoFrame | DialogStyle::NoInput) {
            self.theme = PANEL_THEME;
        }
    }

    /// Whether the user may dismiss the dialog.
    pub fn set_cancelable(&mut self, cancelable: bool) {
        self.cancelable = cancelable;
    }

    /// Current style.
    pub fn style(&self) -> DialogStyle {
        self.style
    }

    /// Current theme resource, zero for the default.
    pub fn theme(&self) -> u32 {
        self.theme
    }

    /// Whether the user may dismiss the dialog.
    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    /// Whether the dialog window is currently shown.
    pub fn is_presented(&self) -> bool {
        self.presented
    }

    fn hide(&mut self, cx: &mut LayerCx<'_>) {
        if !self.presented {
            return;
        }
        self.presented = false;
        if let Some(view) = cx.view() {
            cx.backend().dismiss_detached(view);
        }
    }
}

impl LayerDelegate for DialogDelegate {
    fn is_view_in_layout(&self) -> bool {
        false
    }

    fn on_create(&mut self, _cx: &mut LayerCx<'_>, saved: Option<&Bundle>) {
        let Some(saved) = saved else {
            return;
        };
        if let Some(style) = saved.get::<i32>(DIALOG_STYLE).and_then(DialogStyle::from_raw) {
            self.style = style;
        }
        if let Some(theme) = saved.get::<i32>(DIALOG_THEME) {
            self.theme = u32::try_from(theme).unwrap_or(0);
        }
        if let Some(cancelable) = saved.get::<bool>(DIALOG_CANCELABLE) {
            self.cancelable = cancelable;
        }
    }

    fn on_attach(&mut self, cx: &mut LayerCx<'_>) -> LayersResult<()> {
        let Some(view) = cx.view() else {
            return Ok(());
        };
        cx.backend().present_detached(view, self.cancelable)?;
        self.presented = true;
        tracing::debug!(layer = cx.tag(), ?view, "dialog presented");
        Ok(())
    }

    fn on_detach(&mut self, cx: &mut LayerCx<'_>) {
        self.hide(cx);
    }

    fn on_destroy_view(&mut self, cx: &mut LayerCx<'_>) {
        self.hide(cx);
    }

    fn save_layer_state(&mut self, _cx: &mut LayerCx<'_>, out: &mut Bundle) {
        if self.style != DialogStyle::Normal {
            out.put(DIALOG_STYLE, self.style.to_raw());
        }
        if self.theme != 0 {
            out.put(DIALOG_THEME, i32::try_from(self.theme).unwrap_or(0));
        }
        if !self.cancelable {
            out.put(DIALOG_CANCELABLE, false);
        }
    }

    fn poll(&mut self, cx: &mut LayerCx<'_>) {
        let Some(view) = cx.view() else {
            return;
        };
        if self.presented && cx.backend().take_dismissed(view) {
            self.presented = false;
            tracing::debug!(layer = cx.tag(), "dialog dismissed by user");
            cx.dismiss();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/dialog.rs"]
mod tests;
