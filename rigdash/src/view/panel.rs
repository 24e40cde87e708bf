//! Device panel view.

use iced::widget::{Column, button, column, container, row, scrollable, text, toggler};
use iced::{Alignment, Element, Font, Length};

use crate::layout::{Panel, PanelBody, SensorCharts, ToggleState};
use crate::message::Message;
use crate::view::surface::{ChartSurface, chart_view};
use crate::view::theme;

/// Width of a panel card.
pub const PANEL_WIDTH: f32 = 340.0;
const CHART_WIDTH: f32 = 150.0;
const TEXT_AREA_HEIGHT: f32 = 180.0;

/// Render one device panel.
pub fn panel_view(panel: &Panel<ChartSurface>) -> Element<'_, Message> {
    let header = button(text(&panel.address).size(16))
        .on_press(Message::OpenManagementPage(panel.address.clone()))
        .style(iced::widget::button::secondary)
        .width(Length::Fill);

    let mut content = Column::new().push(header).spacing(8);

    content = match &panel.body {
        PanelBody::Diagnostic { text: log, pause } => content
            .push(text_area(log))
            .push(toggle_row(&panel.address, pause)),
        PanelBody::Sensor {
            charts,
            fan_captions,
        } => content.push(sensor_charts(charts, fan_captions)),
    };

    if let Some(light) = &panel.light {
        content = content.push(toggle_row(&panel.address, light));
    }

    container(content)
        .padding(10)
        .width(Length::Fixed(PANEL_WIDTH))
        .style(theme::panel_card)
        .into()
}

/// Read-only, scrollable multi-line text.
fn text_area(content: &str) -> Element<'_, Message> {
    container(scrollable(
        text(content).size(12).font(Font::MONOSPACE).width(Length::Fill),
    ))
    .padding(6)
    .width(Length::Fill)
    .height(Length::Fixed(TEXT_AREA_HEIGHT))
    .style(theme::text_area)
    .into()
}

/// Hashrate and temperature, fan captions, fan gauges.
fn sensor_charts<'a>(
    charts: &'a SensorCharts<ChartSurface>,
    fan_captions: &'a [String; 2],
) -> Element<'a, Message> {
    let bars = row![
        chart_view(&charts.hashrate, CHART_WIDTH),
        chart_view(&charts.temperature, CHART_WIDTH),
    ]
    .spacing(10);

    let captions = row![
        text(&fan_captions[0]).size(12).width(Length::Fixed(CHART_WIDTH)),
        text(&fan_captions[1]).size(12).width(Length::Fixed(CHART_WIDTH)),
    ]
    .spacing(10);

    let gauges = row![
        chart_view(&charts.fan_left, CHART_WIDTH),
        chart_view(&charts.fan_right, CHART_WIDTH),
    ]
    .spacing(10);

    column![bars, captions, gauges].spacing(6).into()
}

fn toggle_row<'a>(address: &str, state: &'a ToggleState) -> Element<'a, Message> {
    let address = address.to_string();
    let toggle = state.toggle;

    let switch = toggler(state.checked)
        .label(toggle.label())
        .on_toggle(move |checked| Message::ToggleChanged {
            address: address.clone(),
            toggle,
            checked,
        });

    let mut line = row![switch].spacing(10).align_y(Alignment::Center);

    if let Some(error) = &state.delivery_failed {
        line = line.push(
            text(format!("Not delivered: {}", error))
                .size(11)
                .style(theme::warning_text),
        );
    }

    line.into()
}
