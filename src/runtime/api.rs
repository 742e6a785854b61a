use std::sync::Arc;

use crate::assets::{AssetResolver, DecodedAsset, TextAlign};
use crate::device::DeviceProfile;
use crate::foundation::core::{Point, Rect, Rgba8, Rotation};
use crate::render::config::RenderLevel;
use crate::runtime::drawop::DrawOp;
use crate::runtime::timers::TimerQueue;
use crate::runtime::zones::{EventZoneRegistry, PointerPhase, ZoneShape};
use crate::script::{ExecError, HostApi, Value};
use crate::storage::PersistentStorage;

/// Draw ops a single pass may record.
pub(crate) const MAX_DRAW_OPS: usize = 50_000;

/// Arcs sweep at most one full turn in either direction.
pub(crate) const MAX_ARC_SWEEP_DEG: f64 = 360.0;

/// Wall clock shown at simulated time zero, in seconds after midnight (10:09:30).
const CLOCK_ORIGIN_S: u64 = 10 * 3600 + 9 * 60 + 30;

/// Everything the device API can touch. The sandbox sees it only through [`HostApi`].
#[derive(Debug)]
pub(crate) struct DeviceState {
    pub(crate) profile: DeviceProfile,
    pub(crate) render_level: RenderLevel,
    pub(crate) rotation: Rotation,
    pub(crate) ops: Vec<DrawOp>,
    pub(crate) zones: EventZoneRegistry,
    pub(crate) timers: TimerQueue,
    pub(crate) storage: PersistentStorage,
    pub(crate) resolver: Arc<AssetResolver>,
    pub(crate) clock_ms: u64,
    pub(crate) default_font: Option<String>,
    pub(crate) font: Option<String>,
    pub(crate) console: Vec<String>,
}

impl DeviceState {
    pub(crate) fn new(profile: DeviceProfile, resolver: Arc<AssetResolver>) -> Self {
        Self {
            profile,
            render_level: RenderLevel::Normal,
            rotation: profile.default_rotation,
            ops: Vec::new(),
            zones: EventZoneRegistry::new(),
            timers: TimerQueue::default(),
            storage: PersistentStorage::new(),
            resolver,
            clock_ms: 0,
            default_font: None,
            font: None,
            console: Vec::new(),
        }
    }

    /// Drop ops, zones and timers; reset the font to the project default.
    pub(crate) fn reset_transient(&mut self) {
        self.ops.clear();
        self.zones.clear();
        self.timers.clear();
        self.font = self.default_font.clone();
    }

    fn push_op(&mut self, op: DrawOp) -> Result<Value, ExecError> {
        if self.ops.len() >= MAX_DRAW_OPS {
            return Err(ExecError::new(format!(
                "more than {MAX_DRAW_OPS} draw ops in one pass"
            )));
        }
        self.ops.push(op);
        Ok(Value::Null)
    }

    fn log(&mut self, args: &[Value]) -> Value {
        let line = args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(target: "zepp_player::app", "{line}");
        self.console.push(line);
        Value::Null
    }

    fn asset_load(&mut self, path: &str) -> Value {
        match self.resolver.resolve(path, self.profile.asset_variant) {
            Ok(asset) => match asset.as_ref() {
                DecodedAsset::Image(img) => Value::List(vec![
                    Value::Num(f64::from(img.width)),
                    Value::Num(f64::from(img.height)),
                ]),
                DecodedAsset::Font(_) => Value::Bool(true),
            },
            Err(e) => {
                tracing::warn!(path, error = %e, "asset_load failed");
                Value::Null
            }
        }
    }

    fn clock(&self) -> Value {
        let s = (CLOCK_ORIGIN_S + self.clock_ms / 1000) % 86_400;
        Value::List(vec![
            Value::Num((s / 3600) as f64),
            Value::Num((s / 60 % 60) as f64),
            Value::Num((s % 60) as f64),
        ])
    }

    fn dispatch(&mut self, name: &str, a: &Args<'_>) -> Option<Result<Value, ExecError>> {
        let out = match name {
            "fill_rect" => a.arity(5, 6).and_then(|()| {
                let op = DrawOp::FillRect {
                    rect: a.rect(0)?,
                    radius: a.opt_len(5, 0.0)?,
                    color: a.color(4)?,
                };
                self.push_op(op)
            }),
            "stroke_rect" => a.arity(5, 7).and_then(|()| {
                let op = DrawOp::StrokeRect {
                    rect: a.rect(0)?,
                    line_width: a.opt_len(5, 1.0)?,
                    radius: a.opt_len(6, 0.0)?,
                    color: a.color(4)?,
                };
                self.push_op(op)
            }),
            "fill_circle" => a.arity(4, 4).and_then(|()| {
                let op = DrawOp::FillCircle {
                    center: a.point(0)?,
                    radius: a.len(2)?,
                    color: a.color(3)?,
                };
                self.push_op(op)
            }),
            "stroke_arc" => a.arity(6, 7).and_then(|()| {
                let start_deg = a.num(3)?;
                let sweep = (a.num(4)? - start_deg).clamp(-MAX_ARC_SWEEP_DEG, MAX_ARC_SWEEP_DEG);
                let op = DrawOp::StrokeArc {
                    center: a.point(0)?,
                    radius: a.len(2)?,
                    start_deg,
                    end_deg: start_deg + sweep,
                    color: a.color(5)?,
                    line_width: a.opt_len(6, 1.0)?,
                };
                self.push_op(op)
            }),
            "line" => a.arity(5, 6).and_then(|()| {
                let op = DrawOp::Line {
                    from: a.point(0)?,
                    to: a.point(2)?,
                    color: a.color(4)?,
                    line_width: a.opt_len(5, 1.0)?,
                };
                self.push_op(op)
            }),
            "image" => a.arity(3, 4).and_then(|()| {
                let op = DrawOp::Image {
                    path: a.str(0)?.to_owned(),
                    origin: a.point(1)?,
                    size: None,
                    alpha: a.opt_alpha(3)?,
                };
                self.push_op(op)
            }),
            "image_scaled" => a.arity(5, 6).and_then(|()| {
                let op = DrawOp::Image {
                    path: a.str(0)?.to_owned(),
                    origin: a.point(1)?,
                    size: Some((a.len(3)?, a.len(4)?)),
                    alpha: a.opt_alpha(5)?,
                };
                self.push_op(op)
            }),
            "text" => a.arity(7, 8).and_then(|()| {
                let size_px = a.len(4)? as f32;
                if size_px <= 0.0 {
                    return Err(ExecError::new("text size must be > 0"));
                }
                let align = match a.args.get(7) {
                    None | Some(Value::Null) => TextAlign::Left,
                    Some(v) => {
                        let s = v.as_str()?;
                        TextAlign::parse(s)
                            .ok_or_else(|| ExecError::new(format!("unknown text align '{s}'")))?
                    }
                };
                let op = DrawOp::Text {
                    rect: a.rect(0)?,
                    size_px,
                    color: a.color(5)?,
                    text: a.args[6].to_string(),
                    font: self.font.clone(),
                    align,
                };
                self.push_op(op)
            }),
            "set_font" => a.arity(1, 1).and_then(|()| {
                self.font = match &a.args[0] {
                    Value::Null => self.default_font.clone(),
                    v => Some(v.as_str()?.to_owned()),
                };
                Ok(Value::Null)
            }),
            "zone_rect" | "zone_circle" => {
                let circle = name == "zone_circle";
                let handler_at = if circle { 4 } else { 5 };
                a.arity(handler_at + 1, handler_at + 3).and_then(|()| {
                    let id = a.args[0].to_string();
                    let shape = if circle {
                        ZoneShape::Circle {
                            center: a.point(1)?,
                            radius: a.len(3)?,
                        }
                    } else {
                        ZoneShape::Rect(a.rect(1)?)
                    };
                    let handler = a.str(handler_at)?.to_owned();
                    let z_index = match a.args.get(handler_at + 1) {
                        None | Some(Value::Null) => 0,
                        Some(v) => v
                            .as_f64()?
                            .clamp(f64::from(i32::MIN), f64::from(i32::MAX))
                            as i32,
                    };
                    let phases = a.phases(handler_at + 2)?;
                    self.zones.register(id, shape, z_index, handler, phases);
                    Ok(Value::Null)
                })
            }
            "zone_remove" => a
                .arity(1, 1)
                .map(|()| Value::Bool(self.zones.remove(&a.args[0].to_string()))),
            "storage_get" => a.arity(1, 2).and_then(|()| {
                let default = a.args.get(1).map(Value::to_json).unwrap_or_default();
                Ok(Value::from_json(&self.storage.get(a.str(0)?, default)))
            }),
            "storage_set" => a.arity(2, 2).and_then(|()| {
                self.storage
                    .set(a.str(0)?, a.args[1].to_json())
                    .map_err(|e| ExecError::new(e.to_string()))?;
                Ok(Value::Null)
            }),
            "timer_once" | "timer_every" => a.arity(2, 3).and_then(|()| {
                let ms = a.num(0)?;
                if !(0.0..=f64::from(u32::MAX)).contains(&ms) {
                    return Err(ExecError::new(format!("invalid timer delay {ms}")));
                }
                let ms = ms as u64;
                let period = (name == "timer_every").then_some(ms);
                let id = self.timers.schedule(
                    self.clock_ms,
                    ms,
                    period,
                    a.str(1)?.to_owned(),
                    a.args.get(2).cloned(),
                );
                Ok(Value::Num(id as f64))
            }),
            "timer_cancel" => a
                .arity(1, 1)
                .and_then(|()| Ok(Value::Bool(self.timers.cancel(a.num(0)? as u64)))),
            "asset_load" => a.arity(1, 1).and_then(|()| Ok(self.asset_load(a.str(0)?))),
            "screen_width" => a
                .arity(0, 0)
                .map(|()| Value::Num(f64::from(self.profile.screen.width))),
            "screen_height" => a
                .arity(0, 0)
                .map(|()| Value::Num(f64::from(self.profile.screen.height))),
            "screen_shape" => a
                .arity(0, 0)
                .map(|()| Value::from(self.profile.shape.as_str())),
            "rotation" => a
                .arity(0, 0)
                .map(|()| Value::Num(f64::from(self.rotation.degrees()))),
            "render_level" => a
                .arity(0, 0)
                .map(|()| Value::Num(f64::from(self.render_level.as_u8()))),
            "now" => a.arity(0, 0).map(|()| Value::Num(self.clock_ms as f64)),
            "clock" => a.arity(0, 0).map(|()| self.clock()),
            "log" => Ok(self.log(a.args)),
            _ => return None,
        };
        Some(out)
    }
}

impl HostApi for DeviceState {
    fn call(&mut self, name: &str, args: &[Value]) -> Option<Result<Value, ExecError>> {
        self.dispatch(name, &Args { args })
    }
}

/// Typed access to host call arguments.
struct Args<'a> {
    args: &'a [Value],
}

impl Args<'_> {
    fn arity(&self, min: usize, max: usize) -> Result<(), ExecError> {
        let n = self.args.len();
        if n < min || n > max {
            let want = if min == max {
                min.to_string()
            } else {
                format!("{min}..{max}")
            };
            return Err(ExecError::new(format!("expected {want} args, got {n}")));
        }
        Ok(())
    }

    fn num(&self, i: usize) -> Result<f64, ExecError> {
        let v = self.args[i]
            .as_f64()
            .map_err(|e| ExecError::new(format!("arg {}: {}", i + 1, e.message)))?;
        if !v.is_finite() {
            return Err(ExecError::new(format!("arg {} must be finite", i + 1)));
        }
        Ok(v)
    }

    /// Non-negative length.
    fn len(&self, i: usize) -> Result<f64, ExecError> {
        let v = self.num(i)?;
        if v < 0.0 {
            return Err(ExecError::new(format!("arg {} must be >= 0", i + 1)));
        }
        Ok(v)
    }

    fn opt_len(&self, i: usize, default: f64) -> Result<f64, ExecError> {
        match self.args.get(i) {
            None | Some(Value::Null) => Ok(default),
            Some(_) => self.len(i),
        }
    }

    fn opt_alpha(&self, i: usize) -> Result<u8, ExecError> {
        Ok(self.opt_len(i, 255.0)?.min(255.0).round() as u8)
    }

    fn str(&self, i: usize) -> Result<&str, ExecError> {
        self.args[i]
            .as_str()
            .map_err(|e| ExecError::new(format!("arg {}: {}", i + 1, e.message)))
    }

    fn point(&self, i: usize) -> Result<Point, ExecError> {
        Ok(Point::new(self.num(i)?, self.num(i + 1)?))
    }

    /// `x, y, w, h` starting at `i`.
    fn rect(&self, i: usize) -> Result<Rect, ExecError> {
        let (x, y) = (self.num(i)?, self.num(i + 1)?);
        let (w, h) = (self.len(i + 2)?, self.len(i + 3)?);
        Ok(Rect::new(x, y, x + w, y + h))
    }

    fn color(&self, i: usize) -> Result<Rgba8, ExecError> {
        let v = self.num(i)?;
        if !(0.0..=f64::from(u32::MAX)).contains(&v) {
            return Err(ExecError::new(format!("invalid color {v}")));
        }
        Ok(Rgba8::from_device_u32(v as u32))
    }

    fn phases(&self, i: usize) -> Result<Vec<PointerPhase>, ExecError> {
        match self.args.get(i) {
            None | Some(Value::Null) => Ok(PointerPhase::ALL.to_vec()),
            Some(Value::Str(s)) => Ok(vec![parse_phase(s)?]),
            Some(Value::List(items)) => items.iter().map(|v| parse_phase(v.as_str()?)).collect(),
            Some(other) => Err(ExecError::new(format!(
                "phases must be a string or list, got {}",
                other.type_name()
            ))),
        }
    }
}

fn parse_phase(s: &str) -> Result<PointerPhase, ExecError> {
    PointerPhase::parse(s).ok_or_else(|| ExecError::new(format!("unknown pointer phase '{s}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/api.rs"]
mod tests;
