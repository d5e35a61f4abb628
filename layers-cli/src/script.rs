use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, bail};
use layers::{
    AnimRes, AnimationSpec, Bundle, DialogDelegate, HeadlessBackend, Layer, LayerCx,
    LayerDelegates, LayerRegistry, LayerType, LayersResult, LayoutRes, RootHost,
    TransitionBuilder, Value,
};

const SCREEN_LAYOUT: LayoutRes = LayoutRes(1);
const OVERLAY_LAYOUT: LayoutRes = LayoutRes(2);
const DIALOG_LAYOUT: LayoutRes = LayoutRes(3);

const SETTLE_STEP: Duration = Duration::from_millis(16);
const SETTLE_LIMIT: usize = 10_000;

/// A session script: animation resources to register, then steps to run in order.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    pub animations: Vec<AnimationDecl>,
    pub steps: Vec<Step>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationDecl {
    pub res: u32,
    pub kind: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add(Push),
    Replace(Push),
    Remove {
        index: usize,
    },
    Pop,
    PopTo {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        inclusive: bool,
    },
    Clear,
    Back,
    Advance {
        ms: u64,
    },
    Settle,
    DismissDialog,
    Pause,
    Resume,
}

#[derive(Debug, serde::Deserialize)]
pub struct Push {
    pub layer: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub opaque: Option<bool>,
    #[serde(default)]
    pub index: Option<usize>,
    /// `[out, in]` resources for the push.
    #[serde(default)]
    pub in_animation: Option<[u32; 2]>,
    /// `[out, in]` resources for the later removal.
    #[serde(default)]
    pub out_animation: Option<[u32; 2]>,
    #[serde(default)]
    pub animate: Option<bool>,
    #[serde(default)]
    pub arguments: BTreeMap<String, serde_json::Value>,
}

impl Script {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read script '{}'", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse script '{}'", path.display()))
    }

    pub fn register_animations(&self, backend: &mut HeadlessBackend) -> anyhow::Result<()> {
        for decl in &self.animations {
            let spec = AnimationSpec::parse(&decl.kind, &decl.params)
                .with_context(|| format!("animation {}", decl.res))?;
            backend.register_animation(AnimRes(decl.res), spec);
        }
        Ok(())
    }
}

impl Push {
    fn configure(&self, t: &mut TransitionBuilder) {
        if let Some(name) = &self.name {
            t.name(name.clone());
        }
        if let Some(opaque) = self.opaque {
            t.opaque(opaque);
        }
        if let Some(index) = self.index {
            t.index(index);
        }
        if let Some([out_anim, in_anim]) = self.in_animation {
            t.in_animation(AnimRes(out_anim), AnimRes(in_anim));
        }
        if let Some([out_anim, in_anim]) = self.out_animation {
            t.out_animation(AnimRes(out_anim), AnimRes(in_anim));
        }
        if let Some(enabled) = self.animate {
            t.animation_enabled(enabled);
        }
        if !self.arguments.is_empty() {
            t.arguments(arguments_bundle(&self.arguments));
        }
    }
}

fn arguments_bundle(args: &BTreeMap<String, serde_json::Value>) -> Bundle {
    let mut out = Bundle::new();
    for (key, value) in args {
        let value = match value {
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Long(i),
                None => Value::Double(n.as_f64().unwrap_or_default()),
            },
            other => Value::Serialized(other.clone()),
        };
        out.put_value(key.clone(), value);
    }
    out
}

/// Full-window page. Counts how many times it was brought back from saved state.
#[derive(Debug, Default)]
pub struct Screen {
    pub restores: i64,
}

impl Layer for Screen {
    fn layout(&self) -> Option<LayoutRes> {
        Some(SCREEN_LAYOUT)
    }

    fn on_create(&mut self, _cx: &mut LayerCx<'_>, saved: Option<&Bundle>) -> LayersResult<()> {
        if let Some(saved) = saved {
            self.restores = saved.get::<i64>("restores").unwrap_or_default() + 1;
        }
        Ok(())
    }

    fn on_save_layer_state(&mut self, _cx: &mut LayerCx<'_>, out: &mut Bundle) {
        out.put("restores", self.restores);
    }
}

impl LayerType for Screen {
    const TAG: &'static str = "screen";
}

/// Partial overlay. Closes itself on back when `dismiss_on_back` is set.
#[derive(Debug, Default)]
pub struct Overlay;

impl Layer for Overlay {
    fn layout(&self) -> Option<LayoutRes> {
        Some(OVERLAY_LAYOUT)
    }

    fn on_back_pressed(&mut self, cx: &mut LayerCx<'_>) -> bool {
        if cx.opt_argument::<bool>("dismiss_on_back") == Some(true) {
            cx.dismiss();
            return true;
        }
        false
    }
}

impl LayerType for Overlay {
    const TAG: &'static str = "overlay";
}

/// Layer presented as a detached dialog window.
#[derive(Debug, Default)]
pub struct Dialog;

impl Layer for Dialog {
    fn layout(&self) -> Option<LayoutRes> {
        Some(DIALOG_LAYOUT)
    }

    fn install_delegates(&mut self, delegates: &mut LayerDelegates) {
        delegates.add(DialogDelegate::new());
    }
}

impl LayerType for Dialog {
    const TAG: &'static str = "dialog";
}

pub fn registry() -> LayerRegistry {
    LayerRegistry::new()
        .with::<Screen>()
        .with::<Overlay>()
        .with::<Dialog>()
}

pub fn run_step(
    host: &mut RootHost,
    backend: &mut HeadlessBackend,
    step: &Step,
) -> anyhow::Result<()> {
    match step {
        Step::Add(push) => {
            host.layers_mut()
                .add_tagged(backend, &push.layer, |t| push.configure(t))?;
        }
        Step::Replace(push) => {
            host.layers_mut()
                .replace_tagged(backend, &push.layer, |t| push.configure(t))?;
        }
        Step::Remove { index } => {
            host.layers_mut().remove(backend, *index, |_| {})?;
        }
        Step::Pop => {
            if host.layers_mut().pop(backend)?.is_none() {
                tracing::info!("pop on an empty stack");
            }
        }
        Step::PopTo { name, inclusive } => {
            host.layers_mut()
                .pop_layers_to(backend, name.as_deref(), *inclusive)?;
        }
        Step::Clear => {
            host.layers_mut().clear(backend)?;
        }
        Step::Back => {
            if !host.on_back_pressed(backend)? {
                tracing::info!("back press left to the host");
            }
        }
        Step::Advance { ms } => host.advance(backend, Duration::from_millis(*ms))?,
        Step::Settle => settle(host, backend)?,
        Step::DismissDialog => {
            let Some(view) = host.layers().peek().and_then(|l| l.view()) else {
                bail!("dismiss_dialog: top layer has no view");
            };
            if !backend.is_presented(view) {
                bail!("dismiss_dialog: top layer is not a presented dialog");
            }
            backend.user_dismiss(view);
            host.advance(backend, Duration::ZERO)?;
        }
        Step::Pause => {
            host.on_pause(backend)?;
            host.on_stop(backend)?;
        }
        Step::Resume => {
            host.on_start(backend)?;
            host.on_resume(backend)?;
        }
    }
    Ok(())
}

/// Run queued work to completion. The first zero-length tick picks up pending dismissals.
pub fn settle(host: &mut RootHost, backend: &mut HeadlessBackend) -> anyhow::Result<()> {
    host.advance(backend, Duration::ZERO)?;
    for _ in 0..SETTLE_LIMIT {
        if !host.layers().has_pending_transitions() {
            return Ok(());
        }
        host.advance(backend, SETTLE_STEP)?;
    }
    bail!("transitions did not settle")
}
