use std::time::Duration;

use client_core::{AuthMode, LoadState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui::{self, RichText};
use shared::domain::{Note, NoteColor, NoteId, NoteStatus};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent,
    orchestration::dispatch_all,
    reducer::{AppModel, Route},
};
use crate::ui::theme;

const CARD_WIDTH: f32 = 240.0;
const CARD_HEIGHT: f32 = 170.0;

/// Things a screen asked for while it was being drawn; applied once the frame's widgets are done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiAction {
    Navigate(Route),
    SetAuthMode(AuthMode),
    SubmitAuth,
    SubmitNote,
    ToggleStar(NoteId),
    RequestDelete,
    CancelDelete,
    ConfirmDelete,
    ToggleLogoutMenu,
    Logout,
    Reload,
    DismissError,
}

pub struct NotesDesktopApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    model: AppModel,
    api_base_url: String,
}

impl NotesDesktopApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        authenticated: bool,
        api_base_url: String,
    ) -> Self {
        theme::apply(&cc.egui_ctx);
        let mut app = Self {
            cmd_tx,
            ui_rx,
            model: AppModel::new(authenticated),
            api_base_url,
        };
        let cmds = app.model.navigate(Route::Notes);
        app.dispatch(cmds);
        app
    }

    fn dispatch(&mut self, cmds: impl IntoIterator<Item = BackendCommand>) {
        dispatch_all(&self.cmd_tx, cmds, &mut self.model.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            let cmds = self.model.apply(event);
            self.dispatch(cmds);
        }
    }

    fn perform(&mut self, action: UiAction) {
        let cmds: Vec<BackendCommand> = match action {
            UiAction::Navigate(route) => {
                if route == self.model.route() {
                    Vec::new()
                } else {
                    self.model.navigate(route)
                }
            }
            UiAction::Reload => self.model.navigate(self.model.route()),
            UiAction::SetAuthMode(mode) => {
                self.model.set_auth_mode(mode);
                Vec::new()
            }
            UiAction::SubmitAuth => self.model.submit_auth().into_iter().collect(),
            UiAction::SubmitNote => self.model.submit_note().into_iter().collect(),
            UiAction::ToggleStar(id) => self.model.toggle_star(id).into_iter().collect(),
            UiAction::RequestDelete => {
                self.model.request_delete();
                Vec::new()
            }
            UiAction::CancelDelete => {
                self.model.cancel_delete();
                Vec::new()
            }
            UiAction::ConfirmDelete => self.model.confirm_delete().into_iter().collect(),
            UiAction::ToggleLogoutMenu => {
                self.model.toggle_logout_menu();
                Vec::new()
            }
            UiAction::Logout => vec![self.model.logout()],
            UiAction::DismissError => {
                self.model.error = None;
                Vec::new()
            }
        };
        self.dispatch(cmds);
    }

    fn login_screen(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space((ui.available_height() * 0.12).max(24.0));
                ui.label(RichText::new("notes.app").color(theme::MUTED));
                ui.heading(RichText::new("Welcome!").size(30.0).strong());
                ui.label(
                    RichText::new("Access your notes. Sign in with your email.")
                        .color(theme::MUTED),
                );
                ui.add_space(18.0);

                egui::Frame::NONE
                    .fill(theme::PANEL)
                    .corner_radius(14.0)
                    .stroke(egui::Stroke::new(1.0, theme::BORDER))
                    .inner_margin(egui::Margin::symmetric(20, 18))
                    .show(ui, |ui| {
                        ui.set_width(360.0);
                        self.auth_form(ui, actions);
                    });

                if !self.model.status.is_empty() {
                    ui.add_space(10.0);
                    ui.label(RichText::new(&self.model.status).small().color(theme::MUTED));
                }
            });
        });
    }

    fn auth_form(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let mode = self.model.auth_mode;
        ui.horizontal(|ui| {
            for (tab, label) in [(AuthMode::Login, "Login"), (AuthMode::Signup, "Sign Up")] {
                if ui.selectable_label(mode == tab, label).clicked() && mode != tab {
                    actions.push(UiAction::SetAuthMode(tab));
                }
            }
        });
        ui.add_space(12.0);

        if let Some(message) = &self.model.error {
            error_banner(ui, message);
            ui.add_space(8.0);
        }

        let form = &mut self.model.auth_form;
        ui.label(RichText::new("Email").strong());
        ui.add(
            egui::TextEdit::singleline(&mut form.email)
                .hint_text("you@example.com")
                .desired_width(f32::INFINITY),
        );
        if let Some(message) = form.errors.email_message() {
            ui.colored_label(theme::ERROR_TEXT, message);
        }
        ui.add_space(8.0);

        ui.label(RichText::new("Password").strong());
        let hint = match mode {
            AuthMode::Login => "Your password",
            AuthMode::Signup => "Create a password",
        };
        let password = ui.add(
            egui::TextEdit::singleline(&mut form.password)
                .password(true)
                .hint_text(hint)
                .desired_width(f32::INFINITY),
        );
        if let Some(message) = form.errors.password_message() {
            ui.colored_label(theme::ERROR_TEXT, message);
        }
        ui.add_space(14.0);

        let label = match (mode, self.model.signing_in) {
            (AuthMode::Login, false) => "Login",
            (AuthMode::Login, true) => "Signing in...",
            (AuthMode::Signup, false) => "Sign Up",
            (AuthMode::Signup, true) => "Signing up...",
        };
        let submit = ui.add_enabled(
            !self.model.signing_in,
            egui::Button::new(RichText::new(label).strong())
                .fill(theme::SIDEBAR_ACTIVE)
                .min_size(egui::vec2(ui.available_width(), 36.0)),
        );
        let enter = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if submit.clicked() || enter {
            actions.push(UiAction::SubmitAuth);
        }
    }

    fn side_menu(&self, ctx: &egui::Context, route: Route, actions: &mut Vec<UiAction>) {
        egui::SidePanel::left("side_menu")
            .resizable(false)
            .exact_width(96.0)
            .frame(egui::Frame::NONE.fill(theme::SIDEBAR).inner_margin(egui::Margin::symmetric(8, 12)))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    let items = [
                        ("＋ Add", Route::CreateNote),
                        ("⌂ Home", Route::Notes),
                        ("★ Starred", Route::Starred),
                    ];
                    for (label, target) in items {
                        let active = route == target
                            || (target == Route::Notes && matches!(route, Route::EditNote(_)));
                        let button = egui::Button::new(label)
                            .fill(if active { theme::SIDEBAR_ACTIVE } else { theme::SIDEBAR })
                            .min_size(egui::vec2(78.0, 34.0));
                        if ui.add(button).clicked() && route != target {
                            actions.push(UiAction::Navigate(target));
                        }
                        ui.add_space(4.0);
                    }
                    ui.separator();
                    ui.label(RichText::new("NOTES NAV").small().color(theme::MUTED));
                });

                ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
                    if ui
                        .add(egui::Button::new("⚙ Settings").min_size(egui::vec2(78.0, 34.0)))
                        .clicked()
                    {
                        actions.push(UiAction::ToggleLogoutMenu);
                    }
                    if self.model.logout_menu_open {
                        let logout = egui::Button::new(
                            RichText::new("⏻ Logout").color(theme::ERROR_TEXT),
                        )
                        .min_size(egui::vec2(78.0, 30.0));
                        if ui.add(logout).clicked() {
                            actions.push(UiAction::Logout);
                        }
                    }
                    if let Some(email) = &self.model.signed_in_as {
                        ui.label(RichText::new(email).small().color(theme::MUTED));
                    }
                });
            });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(&self.api_base_url).small().color(theme::MUTED));
                if !self.model.status.is_empty() {
                    ui.separator();
                    ui.label(RichText::new(&self.model.status).small());
                }
            });
        });
    }

    fn board_screen(&mut self, ui: &mut egui::Ui, route: Route, actions: &mut Vec<UiAction>) {
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            let (marker, color) = match route {
                Route::Starred => ("★", theme::STAR),
                _ => ("✎", theme::ACCENT),
            };
            ui.label(RichText::new(marker).size(30.0).color(color));
            ui.heading(RichText::new(route.title()).size(30.0).strong());
        });
        ui.add_space(8.0);
        ui.add(
            egui::TextEdit::singleline(self.model.board.search_mut())
                .hint_text("Search notes by title...")
                .desired_width(420.0),
        );
        ui.add_space(12.0);

        if let Some(message) = &self.model.error {
            if error_banner_dismissable(ui, message) {
                actions.push(UiAction::DismissError);
            }
            ui.add_space(8.0);
        }

        match self.model.board.state() {
            LoadState::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.spinner();
                    ui.label("Loading your notes...");
                });
                return;
            }
            LoadState::Failed(message) => {
                error_banner(ui, message);
                if ui.button("Retry").clicked() {
                    actions.push(UiAction::Reload);
                }
                return;
            }
            LoadState::Ready => {}
        }

        let visible: Vec<Note> = self.model.board.visible().into_iter().cloned().collect();
        if visible.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(RichText::new(self.model.board.empty_message()).color(theme::MUTED));
            });
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(14.0, 14.0);
                    for note in &visible {
                        let toggling = self.model.board.is_toggling(note.id);
                        note_card(ui, note, toggling, actions);
                    }
                });
            });
    }

    fn editor_screen(&mut self, ui: &mut egui::Ui, route: Route, actions: &mut Vec<UiAction>) {
        let editing = matches!(route, Route::EditNote(_));
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            ui.heading(RichText::new(route.title()).size(30.0).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✖ Cancel").clicked() {
                    actions.push(UiAction::Navigate(Route::Notes));
                }
                if editing
                    && ui
                        .add(egui::Button::new("🗑 Delete").fill(theme::DANGER))
                        .clicked()
                {
                    actions.push(UiAction::RequestDelete);
                }
            });
        });
        ui.add_space(12.0);

        if self.model.note_loading {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.spinner();
                ui.label("Loading note...");
            });
            return;
        }

        if let Some(message) = &self.model.error {
            error_banner(ui, message);
            ui.add_space(8.0);
        }

        if self.model.confirm_delete {
            delete_confirmation(ui, actions);
            ui.add_space(8.0);
        }

        let form = &mut self.model.note_form;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.set_max_width(760.0);

                ui.horizontal(|ui| {
                    ui.label(RichText::new("Title").strong());
                    ui.colored_label(theme::ERROR_TEXT, "*");
                });
                ui.add(
                    egui::TextEdit::singleline(&mut form.title)
                        .hint_text("Enter note title...")
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(10.0);

                ui.label(RichText::new("Content").strong());
                ui.add(
                    egui::TextEdit::multiline(&mut form.content)
                        .hint_text("Write your note here...")
                        .desired_rows(10)
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(10.0);

                ui.label(RichText::new("Color").strong());
                ui.horizontal_wrapped(|ui| {
                    for color in NoteColor::ALL {
                        color_swatch(ui, color, &mut form.color);
                    }
                });
                ui.add_space(10.0);

                ui.label(RichText::new("Status").strong());
                ui.horizontal_wrapped(|ui| {
                    for status in NoteStatus::ALL {
                        let text = format!("{} {}", theme::status_marker(status), status.label());
                        if ui.selectable_label(form.status == status, text).clicked() {
                            form.status = status;
                        }
                    }
                });
                ui.add_space(10.0);

                let star_text = if form.starred {
                    RichText::new("★ Starred").color(theme::STAR)
                } else {
                    RichText::new("☆ Star this note").color(theme::MUTED)
                };
                if ui.add(egui::Button::new(star_text)).clicked() {
                    form.starred = !form.starred;
                }
                ui.add_space(16.0);

                let label = match (editing, self.model.saving) {
                    (false, false) => "Create Note",
                    (false, true) => "Creating...",
                    (true, false) => "Save Changes",
                    (true, true) => "Saving...",
                };
                let can_submit = form.can_submit() && !self.model.saving;
                let submit = ui.add_enabled(
                    can_submit,
                    egui::Button::new(RichText::new(label).strong())
                        .fill(theme::SIDEBAR_ACTIVE)
                        .min_size(egui::vec2(180.0, 36.0)),
                );
                if submit.clicked() {
                    actions.push(UiAction::SubmitNote);
                }
            });
    }
}

impl eframe::App for NotesDesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut actions = Vec::new();
        match self.model.route() {
            Route::Login => self.login_screen(ctx, &mut actions),
            route => {
                self.side_menu(ctx, route, &mut actions);
                self.status_bar(ctx);
                egui::CentralPanel::default().show(ctx, |ui| match route {
                    Route::Notes | Route::Starred => self.board_screen(ui, route, &mut actions),
                    Route::CreateNote | Route::EditNote(_) => {
                        self.editor_screen(ui, route, &mut actions)
                    }
                    Route::Login => {}
                });
            }
        }

        for action in actions {
            self.perform(action);
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

fn note_card(ui: &mut egui::Ui, note: &Note, toggling: bool, actions: &mut Vec<UiAction>) {
    let text = theme::note_text(note.color);
    egui::Frame::NONE
        .fill(theme::note_fill(note.color))
        .corner_radius(12.0)
        .inner_margin(egui::Margin::symmetric(14, 12))
        .show(ui, |ui| {
            ui.set_width(CARD_WIDTH);
            ui.set_height(CARD_HEIGHT);
            ui.horizontal(|ui| {
                let title = egui::Label::new(RichText::new(&note.title).strong().size(16.0).color(text))
                    .sense(egui::Sense::click())
                    .truncate();
                if ui.add(title).on_hover_text("Edit note").clicked() {
                    actions.push(UiAction::Navigate(Route::EditNote(note.id)));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (glyph, color) = if note.starred {
                        ("★", theme::STAR)
                    } else {
                        ("☆", text)
                    };
                    let star = egui::Button::new(RichText::new(glyph).size(18.0).color(color))
                        .frame(false);
                    if ui.add_enabled(!toggling, star).clicked() {
                        actions.push(UiAction::ToggleStar(note.id));
                    }
                });
            });
            ui.add_space(4.0);
            let preview: String = note.content.chars().take(160).collect();
            ui.label(RichText::new(preview).color(text));
            ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(note.display_date()).small().color(text));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let badge = format!(
                            "{} {}",
                            theme::status_marker(note.status),
                            note.status.label()
                        );
                        ui.label(RichText::new(badge).small().strong().color(text));
                    });
                });
            });
        });
}

fn color_swatch(ui: &mut egui::Ui, color: NoteColor, selected: &mut NoteColor) {
    let active = *selected == color;
    let stroke = if active {
        egui::Stroke::new(2.0, egui::Color32::WHITE)
    } else {
        egui::Stroke::new(1.0, theme::BORDER)
    };
    let button = egui::Button::new(RichText::new(color.label()).color(theme::note_text(color)))
        .fill(theme::note_fill(color))
        .stroke(stroke)
        .min_size(egui::vec2(88.0, 30.0));
    if ui.add(button).clicked() {
        *selected = color;
    }
}

fn delete_confirmation(ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
    egui::Frame::NONE
        .fill(theme::WARNING_FILL)
        .corner_radius(10.0)
        .stroke(egui::Stroke::new(1.0, theme::WARNING_TEXT))
        .inner_margin(egui::Margin::symmetric(14, 12))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.colored_label(
                theme::WARNING_TEXT,
                "Are you sure you want to delete this note? This action cannot be undone.",
            );
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if ui
                    .add(egui::Button::new("Yes, Delete").fill(theme::DANGER))
                    .clicked()
                {
                    actions.push(UiAction::ConfirmDelete);
                }
                if ui.button("Cancel").clicked() {
                    actions.push(UiAction::CancelDelete);
                }
            });
        });
}

fn error_banner(ui: &mut egui::Ui, message: &str) {
    egui::Frame::NONE
        .fill(theme::ERROR_FILL)
        .corner_radius(10.0)
        .stroke(egui::Stroke::new(1.0, theme::ERROR_TEXT))
        .inner_margin(egui::Margin::symmetric(12, 10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.colored_label(theme::ERROR_TEXT, format!("⚠ {message}"));
        });
}

fn error_banner_dismissable(ui: &mut egui::Ui, message: &str) -> bool {
    let mut dismissed = false;
    ui.horizontal(|ui| {
        ui.colored_label(theme::ERROR_TEXT, format!("⚠ {message}"));
        dismissed = ui.small_button("✖").clicked();
    });
    dismissed
}
