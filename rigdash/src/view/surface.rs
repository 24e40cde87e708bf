//! Canvas-backed chart surface.

use std::f32::consts::{FRAC_PI_2, TAU};

use iced::mouse;
use iced::widget::canvas::{self, Cache, Canvas, Frame, Geometry, Path, Stroke, Text};
use iced::{Color, Element, Length, Point, Radians, Rectangle, Renderer, Size, Theme};

use crate::graphs::{ChartKind, ChartSpec, Rgba, Surface, ValueAxis};
use crate::message::Message;
use crate::view::formatting::format_value;

/// A chart surface drawn with an iced canvas.
#[derive(Default)]
pub struct ChartSurface {
    spec: Option<ChartSpec>,
    cache: Cache,
}

impl ChartSurface {
    /// The chart currently shown.
    pub fn spec(&self) -> Option<&ChartSpec> {
        self.spec.as_ref()
    }
}

impl std::fmt::Debug for ChartSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSurface")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl Surface for ChartSurface {
    fn render(&mut self, spec: ChartSpec) {
        self.spec = Some(spec);
        self.cache.clear();
    }
}

fn to_color(rgba: Rgba) -> Color {
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

/// Canvas program drawing one [`ChartSurface`].
struct ChartView<'a> {
    surface: &'a ChartSurface,
}

impl canvas::Program<Message> for ChartView<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let text_color = theme.extended_palette().background.base.text;

        let geometry = self.surface.cache.draw(renderer, bounds.size(), |frame| {
            let Some(spec) = &self.surface.spec else {
                return;
            };
            match spec.kind {
                ChartKind::Bar => draw_bars(frame, spec, bounds.size(), text_color),
                ChartKind::Doughnut => draw_doughnut(frame, spec, bounds.size(), text_color),
            }
        });

        vec![geometry]
    }
}

fn draw_bars(frame: &mut Frame, spec: &ChartSpec, size: Size, text_color: Color) {
    let left = 34.0;
    let bottom = 20.0;
    let top = 8.0;
    let plot_width = size.width - left - 6.0;
    let plot_height = size.height - bottom - top;

    if plot_width <= 0.0 || plot_height <= 0.0 {
        return;
    }

    let peak = spec.peak();
    let axis = spec.options.value_axis.unwrap_or(ValueAxis {
        min: 0.0,
        suggested_max: 0.0,
        step: 0.0,
        reference: None,
    });
    let max = if axis.step > 0.0 {
        axis.max_for(peak)
    } else {
        (peak * 1.1).max(1.0)
    };
    let range = (max - axis.min).max(f64::EPSILON);
    let y_for = |value: f64| {
        let ratio = ((value - axis.min) / range).clamp(0.0, 1.0) as f32;
        top + plot_height * (1.0 - ratio)
    };

    let ticks = if axis.step > 0.0 {
        axis.ticks(peak)
    } else {
        (0..=4).map(|i| axis.min + range * f64::from(i) / 4.0).collect()
    };
    for tick in ticks {
        let y = y_for(tick);
        let color = axis
            .reference
            .map(|r| to_color(r.color_for(tick)))
            .unwrap_or(Color { a: 0.2, ..text_color });

        frame.stroke(
            &Path::line(Point::new(left, y), Point::new(left + plot_width, y)),
            Stroke::default().with_color(color).with_width(1.0),
        );
        frame.fill_text(Text {
            content: format_value(tick),
            position: Point::new(2.0, y - 6.0),
            color: text_color,
            size: 10.0.into(),
            ..Text::default()
        });
    }

    let bars: Vec<_> = spec
        .series
        .iter()
        .filter_map(|s| Some((s.values.first().copied()?, s.colors.first().copied()?)))
        .collect();

    if !bars.is_empty() {
        let slot = plot_width / bars.len() as f32;
        let width = slot * 0.8;
        for (i, (value, color)) in bars.into_iter().enumerate() {
            let x = left + slot * i as f32 + (slot - width) / 2.0;
            let y = y_for(value);
            let height = top + plot_height - y;
            frame.fill(
                &Path::rectangle(Point::new(x, y), Size::new(width, height)),
                to_color(color),
            );
        }
    }

    if let Some(label) = spec.labels.first() {
        frame.fill_text(Text {
            content: label.clone(),
            position: Point::new(left + plot_width / 2.0 - 20.0, size.height - bottom + 4.0),
            color: text_color,
            size: 11.0.into(),
            ..Text::default()
        });
    }
}

fn draw_doughnut(frame: &mut Frame, spec: &ChartSpec, size: Size, text_color: Color) {
    let Some(series) = spec.series.first() else {
        return;
    };

    let center = Point::new(size.width / 2.0, size.height / 2.0);
    let radius = size.width.min(size.height) / 2.0 * 0.8;
    if radius <= 0.0 {
        return;
    }
    let thickness = radius * 0.35;

    let total: f64 = series.values.iter().map(|v| v.max(0.0)).sum();
    if total > 0.0 {
        let mut start = -FRAC_PI_2;
        for (value, color) in series.values.iter().zip(&series.colors) {
            let sweep = (value.max(0.0) / total) as f32 * TAU;
            if sweep <= 0.0 {
                continue;
            }
            let arc = Path::new(|builder| {
                builder.arc(canvas::path::Arc {
                    center,
                    radius: radius - thickness / 2.0,
                    start_angle: Radians(start),
                    end_angle: Radians(start + sweep),
                });
            });
            frame.stroke(
                &arc,
                Stroke::default()
                    .with_color(to_color(*color))
                    .with_width(thickness),
            );
            start += sweep;
        }
    }

    if let Some(label) = spec.labels.first() {
        frame.fill_text(Text {
            content: label.clone(),
            position: Point::new(center.x - 14.0, center.y - 6.0),
            color: text_color,
            size: 11.0.into(),
            ..Text::default()
        });
    }
}

/// Chart element with the given width; height follows the chart's aspect ratio.
pub fn chart_view(surface: &ChartSurface, width: f32) -> Element<'_, Message> {
    let aspect_ratio = surface
        .spec
        .as_ref()
        .map(|s| s.options.aspect_ratio)
        .filter(|r| *r > 0.0)
        .unwrap_or(1.0);

    Canvas::new(ChartView { surface })
        .width(Length::Fixed(width))
        .height(Length::Fixed(width / aspect_ratio))
        .into()
}
