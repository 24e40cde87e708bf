//! rigdash Iced application.

use std::sync::Arc;

use iced::{Element, Subscription, Task, Theme};

use rigdash_common::RigdashConfig;

use crate::control::{ControlHandle, OfflineControl};
use crate::layout::{Dashboard, PendingCheck, PendingCommand};
use crate::message::Message;
use crate::navigate;
use crate::subscription::{FeedSettings, demo_subscription, tick_subscription, zenoh_subscription};
use crate::view::dashboard::{DashboardStatus, dashboard_view};
use crate::view::formatting::{format_device_count, now_ms};
use crate::view::surface::ChartSurface;

/// Where snapshots come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedMode {
    /// Live feed over Zenoh.
    #[default]
    Zenoh,
    /// Simulated testbench.
    Demo,
}

/// The main rigdash application.
pub struct Rigdash {
    config: RigdashConfig,
    mode: FeedMode,
    dashboard: Dashboard<ChartSurface>,
    /// Channel used for checks and commands; offline until connected.
    channel: ControlHandle,
    status: DashboardStatus,
}

impl Rigdash {
    pub fn new(config: RigdashConfig, mode: FeedMode) -> Self {
        Self {
            config,
            mode,
            dashboard: Dashboard::new(),
            channel: Arc::new(OfflineControl),
            status: DashboardStatus {
                now: now_ms(),
                ..DashboardStatus::default()
            },
        }
    }

    /// Boot the rigdash application (called by iced::application).
    pub fn boot(config: RigdashConfig, mode: FeedMode) -> (Self, Task<Message>) {
        (Self::new(config, mode), Task::none())
    }

    pub fn dashboard(&self) -> &Dashboard<ChartSurface> {
        &self.dashboard
    }

    pub fn status(&self) -> &DashboardStatus {
        &self.status
    }

    /// Get the window title.
    pub fn title(&self) -> String {
        match self.dashboard.panels().len() {
            0 => "rigdash".to_string(),
            n => format!("rigdash - {}", format_device_count(n)),
        }
    }

    /// Handle incoming messages.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Connected(channel) => {
                tracing::info!(channel = ?channel, "Control channel ready");
                self.channel = channel;
                self.status.connected = true;
                self.status.last_error = None;
            }

            Message::Disconnected(error) => {
                tracing::warn!(error = %error, "Disconnected from feed");
                self.channel = Arc::new(OfflineControl);
                self.status.connected = false;
                self.status.last_error = Some(error);
            }

            Message::SnapshotReceived(devices) => {
                self.status.last_snapshot = Some(now_ms());
                let checks = self.dashboard.render(devices, self.channel.as_ref());
                return Task::batch(checks.into_iter().map(check_task));
            }

            Message::CheckReplied {
                generation,
                address,
                toggle,
                result,
            } => {
                self.dashboard
                    .apply_check(generation, &address, toggle, result);
            }

            Message::ToggleChanged {
                address,
                toggle,
                checked,
            } => {
                if let Some(pending) =
                    self.dashboard
                        .toggle(&address, toggle, checked, self.channel.as_ref())
                {
                    return command_task(pending);
                }
            }

            Message::CommandDelivered {
                generation,
                address,
                toggle,
                command,
                result,
            } => {
                if result.is_ok() {
                    tracing::debug!(address = %address, command = %command, "Command delivered");
                }
                self.dashboard
                    .apply_delivery(generation, &address, toggle, result);
            }

            Message::OpenManagementPage(address) => {
                let url = self.config.dashboard.management_url(&address);
                return Task::perform(navigate::open_url(url.clone()), move |result| {
                    Message::ManagementPageOpened { url, result }
                });
            }

            Message::ManagementPageOpened { url, result } => {
                if let Err(error) = result {
                    tracing::warn!(url = %url, error = %error, "Failed to open management page");
                    self.status.last_error = Some(error);
                }
            }

            Message::Tick => {
                self.status.now = now_ms();
            }
        }

        Task::none()
    }

    /// Create subscriptions for the snapshot feed and periodic updates.
    pub fn subscription(&self) -> Subscription<Message> {
        let feed = match self.mode {
            FeedMode::Zenoh => zenoh_subscription(FeedSettings {
                zenoh: self.config.zenoh.clone(),
                dashboard: self.config.dashboard.clone(),
            }),
            FeedMode::Demo => demo_subscription(),
        };

        Subscription::batch([feed, tick_subscription()])
    }

    /// Render the view.
    pub fn view(&self) -> Element<'_, Message> {
        dashboard_view(&self.dashboard, &self.status)
    }

    /// Get the application theme.
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Run a toggle check and report its reply.
fn check_task(check: PendingCheck) -> Task<Message> {
    let PendingCheck {
        generation,
        address,
        toggle,
        reply,
    } = check;

    Task::perform(reply, move |result| Message::CheckReplied {
        generation,
        address,
        toggle,
        result,
    })
}

/// Deliver a command and report the outcome.
fn command_task(pending: PendingCommand) -> Task<Message> {
    let PendingCommand {
        generation,
        address,
        toggle,
        command,
        delivery,
    } = pending;

    Task::perform(delivery, move |result| Message::CommandDelivered {
        generation,
        address,
        toggle,
        command,
        result,
    })
}
