//! Dashboard view showing one panel per device.

use iced::widget::{Column, Row, column, container, row, rule, scrollable, text};
use iced::{Alignment, Element, Length};

use crate::layout::Dashboard;
use crate::message::Message;
use crate::view::formatting::{format_age, format_device_count};
use crate::view::panel::panel_view;
use crate::view::surface::ChartSurface;
use crate::view::theme;

/// Connection state shown in the dashboard header.
#[derive(Debug, Clone, Default)]
pub struct DashboardStatus {
    /// Whether the feed transport is connected.
    pub connected: bool,
    /// Last error message, if any.
    pub last_error: Option<String>,
    /// When the last snapshot arrived (Unix epoch ms).
    pub last_snapshot: Option<i64>,
    /// Time of the last tick (Unix epoch ms).
    pub now: i64,
}

/// Render the dashboard view.
pub fn dashboard_view<'a>(
    dashboard: &'a Dashboard<ChartSurface>,
    status: &'a DashboardStatus,
) -> Element<'a, Message> {
    let header = render_header(dashboard, status);
    let panels = render_panels(dashboard);

    let content = column![header, rule::horizontal(1), panels]
        .spacing(10)
        .padding(20);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Render the header with connection status.
fn render_header<'a>(
    dashboard: &'a Dashboard<ChartSurface>,
    status: &'a DashboardStatus,
) -> Element<'a, Message> {
    let title = text("Rig Dashboard").size(24);
    let device_count = text(format_device_count(dashboard.panels().len())).size(14);

    let status_text = text(if status.connected {
        "Connected"
    } else {
        "Disconnected"
    })
    .size(14)
    .style(theme::status_text(status.connected));

    let mut header_row = row![title, device_count, status_text]
        .spacing(20)
        .align_y(Alignment::Center);

    if let Some(at) = status.last_snapshot {
        header_row = header_row.push(
            text(format!(
                "Updated {}",
                format_age(status.now.saturating_sub(at))
            ))
            .size(12)
            .style(theme::muted_text),
        );
    }

    let mut header_col = Column::new().push(header_row);

    if let Some(ref error) = status.last_error {
        header_col = header_col.push(
            text(format!("Error: {}", error))
                .size(12)
                .style(theme::error_text),
        );
    }

    header_col.spacing(5).into()
}

/// Render the panel grid, wrapping to the window width.
fn render_panels(dashboard: &Dashboard<ChartSurface>) -> Element<'_, Message> {
    if dashboard.panels().is_empty() {
        return container(text("Waiting for miner data...").size(16))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    }

    let grid = Row::with_children(dashboard.panels().iter().map(panel_view))
        .spacing(10)
        .wrap()
        .vertical_spacing(10);

    scrollable(grid)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
