//! Main application UI.
//! Handles deck management and drives the review controller from button clicks.

use chrono::{DateTime, Local};
use eframe::egui;
use study_tracker::clock::{Clock, OffsetClock};
use study_tracker::export::json::{export_json_to_path, import_json};
use study_tracker::models::scheduler::{due_count, format_interval, preview};
use study_tracker::{
    Achievement, AchievementNotifier, Deck, DeckRepository, Grade, ReviewController, ReviewError,
    Store,
};

type Controller = ReviewController<Store, Store, OffsetClock>;

/// Application screen states
#[derive(Default)]
enum AppScreen {
    #[default]
    Main,
    Deck(String),
    Review,
}

/// Main application state
pub struct MyApp {
    store: Store,
    controller: Controller,
    decks: Vec<Deck>,
    achievements: Vec<Achievement>,

    current_screen: AppScreen,
    new_deck_name: String,
    current_front: String,
    current_back: String,

    show_confirmation_dialog: bool,
    allowed_to_close: bool,
    show_export_dialog: bool,
    pending_deck_delete: Option<String>,
    message: Option<String>,
}

/// Formats a millisecond timestamp as a local YYYY-MM-DD string
fn format_date(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.current_screen {
            AppScreen::Main => self.render_main_screen(ctx),
            AppScreen::Deck(_) => self.render_deck_screen(ctx),
            AppScreen::Review => self.render_review_screen(ctx),
        }

        // Handle window close requests with confirmation dialog
        if ctx.input(|i| i.viewport().close_requested()) && !self.allowed_to_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_confirmation_dialog = true;
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Do you want to quit?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }

        if self.show_export_dialog {
            self.render_export_dialog(ctx);
        }

        if let Some(deck_id) = self.pending_deck_delete.clone() {
            self.render_delete_dialog(ctx, &deck_id);
        }

        if let Some(message) = self.message.clone() {
            egui::Window::new("Study Tracker")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.message = None;
                    }
                });
        }
    }
}

impl MyApp {
    pub fn new(store: Store) -> Self {
        let (offset_days, offset_error) = match store.load_day_offset() {
            Ok(days) => (days, None),
            Err(e) => (0, Some(format!("Failed to load simulated date: {}", e))),
        };
        let clock = OffsetClock::with_offset_days(offset_days);
        let controller = ReviewController::new(store.clone(), store.clone(), clock);
        let mut app = Self {
            store,
            controller,
            decks: Vec::new(),
            achievements: Vec::new(),
            current_screen: AppScreen::Main,
            new_deck_name: String::new(),
            current_front: String::new(),
            current_back: String::new(),
            show_confirmation_dialog: false,
            allowed_to_close: false,
            show_export_dialog: false,
            pending_deck_delete: None,
            message: offset_error,
        };
        app.reload();
        app
    }

    fn now(&self) -> i64 {
        self.controller.clock().now()
    }

    /// Re-reads decks and achievements after any change
    fn reload(&mut self) {
        match self.store.get_decks() {
            Ok(decks) => self.decks = decks,
            Err(e) => self.message = Some(format!("Failed to load decks: {}", e)),
        }
        match self.store.achievements() {
            Ok(achievements) => self.achievements = achievements,
            Err(e) => self.message = Some(format!("Failed to load achievements: {}", e)),
        }
    }

    fn report<T>(&mut self, result: Result<T, ReviewError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("{}", e);
                self.message = Some(e.to_string());
                None
            }
        }
    }

    /// Renders the deck list with creation, import/export and study actions
    fn render_main_screen(&mut self, ctx: &egui::Context) {
        let now = self.now();
        let mut action_next_day = false;
        let mut action_create = false;
        let mut action_import = false;
        let mut action_open: Option<String> = None;
        let mut action_study: Option<String> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format_date(now));
                if ui.button("Next Day").clicked() {
                    action_next_day = true;
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Export Deck").clicked() {
                    self.show_export_dialog = true;
                }
                if ui.button("Import Deck").clicked() {
                    action_import = true;
                }
            });
            ui.separator();

            ui.heading("Create New Deck");
            ui.horizontal(|ui| {
                ui.label("Deck name:");
                ui.text_edit_singleline(&mut self.new_deck_name);
                if ui.button("Create Deck").clicked() {
                    action_create = true;
                }
            });
            ui.separator();

            ui.heading(format!("Decks ({})", self.decks.len()));
            egui::ScrollArea::vertical()
                .id_source("decks_list")
                .max_height(300.0)
                .show(ui, |ui| {
                    if self.decks.is_empty() {
                        ui.label("No decks yet. Create a deck to start building your knowledge base.");
                    }
                    for deck in &self.decks {
                        let due = due_count(deck, now);
                        ui.group(|ui| {
                            ui.horizontal(|ui| {
                                ui.label(format!("{} ({} cards)", deck.name, deck.cards.len()));
                                if due > 0 {
                                    ui.label(format!("• {} due", due));
                                }
                            });
                            ui.horizontal(|ui| {
                                let study_label = if due > 0 { "Study Now" } else { "All Done" };
                                if ui.add_enabled(due > 0, egui::Button::new(study_label)).clicked() {
                                    action_study = Some(deck.id.clone());
                                }
                                if ui.button("Edit").clicked() {
                                    action_open = Some(deck.id.clone());
                                }
                                if ui.button("Delete").clicked() {
                                    self.pending_deck_delete = Some(deck.id.clone());
                                }
                            });
                        });
                    }
                });

            ui.separator();
            ui.heading(format!("Achievements ({})", self.achievements.len()));
            for achievement in &self.achievements {
                ui.label(format!("{} {}", achievement.icon, achievement.title));
            }
        });

        // Execute deferred actions
        if action_next_day {
            self.controller.clock().advance_days(1);
            let saved = self
                .store
                .save_day_offset(self.controller.clock().offset_days())
                .map_err(ReviewError::from);
            self.report(saved);
        }
        if action_create {
            let created = self.store.create_deck(&self.new_deck_name);
            if self.report(created).is_some() {
                self.new_deck_name.clear();
                self.reload();
            }
        }
        if action_import {
            self.handle_import();
        }
        if let Some(deck_id) = action_open {
            self.current_screen = AppScreen::Deck(deck_id);
        }
        if let Some(deck_id) = action_study {
            self.start_review(&deck_id);
        }
    }

    /// Renders a single deck with card creation and deletion
    fn render_deck_screen(&mut self, ctx: &egui::Context) {
        let AppScreen::Deck(deck_id) = &self.current_screen else {
            return;
        };
        let deck_id = deck_id.clone();
        let Some(deck) = self.decks.iter().find(|d| d.id == deck_id).cloned() else {
            self.current_screen = AppScreen::Main;
            return;
        };

        let mut action_back = false;
        let mut action_add = false;
        let mut action_delete: Option<String> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("← Back to Decks").clicked() {
                    action_back = true;
                }
                ui.heading(format!("{} ({} cards)", deck.name, deck.cards.len()));
            });
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Front:");
                ui.text_edit_multiline(&mut self.current_front);
            });
            ui.horizontal(|ui| {
                ui.label("Back:");
                ui.text_edit_multiline(&mut self.current_back);
            });
            if ui.button("Add Card").clicked() {
                action_add = true;
            }
            ui.separator();

            egui::ScrollArea::vertical()
                .id_source("cards_list")
                .max_height(400.0)
                .show(ui, |ui| {
                    if deck.cards.is_empty() {
                        ui.label("This deck is empty. Add some cards!");
                    }
                    for (i, card) in deck.cards.iter().enumerate() {
                        ui.group(|ui| {
                            ui.horizontal(|ui| {
                                ui.vertical(|ui| {
                                    ui.label(format!("{}. Q: {}", i + 1, card.front));
                                    ui.label(format!("   A: {}", card.back));
                                    ui.small(format!(
                                        "due {} • interval {}d • ease {:.2}",
                                        format_date(card.due_date),
                                        card.interval,
                                        card.ease
                                    ));
                                });
                                if ui.button("Delete").clicked() {
                                    action_delete = Some(card.id.clone());
                                }
                            });
                        });
                    }
                });
        });

        if action_back {
            self.current_screen = AppScreen::Main;
        }
        if action_add {
            let now = self.now();
            let added = self
                .store
                .add_card(&deck_id, &self.current_front, &self.current_back, now);
            if self.report(added).is_some() {
                self.current_front.clear();
                self.current_back.clear();
                self.reload();
            }
        }
        if let Some(card_id) = action_delete {
            let deleted = self.store.delete_card(&deck_id, &card_id);
            if self.report(deleted).is_some() {
                self.reload();
            }
        }
    }

    /// Renders the review screen: front, reveal, then grade buttons
    fn render_review_screen(&mut self, ctx: &egui::Context) {
        let Some(session) = self.controller.session().cloned() else {
            self.current_screen = AppScreen::Main;
            return;
        };
        let Some(card) = session.current_card().cloned() else {
            self.current_screen = AppScreen::Main;
            return;
        };
        let now = self.now();

        let mut action_flip = false;
        let mut action_grade: Option<Grade> = None;
        let mut action_quit = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Quit").clicked() {
                    action_quit = true;
                }
                ui.label(format!("{} / {}", session.position(), session.len()));
            });
            ui.add(egui::ProgressBar::new(session.progress()));
            ui.add_space(20.0);

            ui.group(|ui| {
                ui.set_min_height(200.0);
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading("Question");
                    ui.label(&card.front);
                    ui.add_space(20.0);

                    if session.is_flipped() {
                        ui.heading("Answer");
                        ui.label(&card.back);
                    } else {
                        ui.label("(Click 'Show Answer' to reveal)");
                    }
                    ui.add_space(20.0);
                });
            });
            ui.add_space(20.0);

            if session.is_flipped() {
                ui.label("How well did you remember?");
                ui.horizontal(|ui| {
                    for (grade, update) in preview(&card, now) {
                        let label = format!("{} ({})", grade.label(), format_interval(&update, now));
                        if ui.button(label).clicked() {
                            action_grade = Some(grade);
                        }
                    }
                });
            } else if ui.button("Show Answer").clicked() {
                action_flip = true;
            }
        });

        if action_flip {
            let flipped = self.controller.flip();
            self.report(flipped);
        }
        if let Some(grade) = action_grade {
            let rated = self.controller.rate(grade);
            if let Some(outcome) = self.report(rated) {
                if let Some(done) = outcome.completed {
                    self.message = Some(if done.newly_unlocked {
                        format!(
                            "Review Session Complete! Great job.\n\nAchievement unlocked: Flashcard Master ({} cards reviewed)",
                            done.reviewed
                        )
                    } else {
                        format!("Review Session Complete! Great job. ({} cards reviewed)", done.reviewed)
                    });
                }
            }
            self.reload();
        }
        if action_quit {
            self.controller.quit();
            self.reload();
        }
        if !self.controller.is_active() {
            self.current_screen = AppScreen::Main;
        }
    }

    /// Starts a review session with the cards due now
    fn start_review(&mut self, deck_id: &str) {
        let started = self.controller.start(deck_id);
        match self.report(started) {
            Some(true) => self.current_screen = AppScreen::Review,
            Some(false) => self.message = Some("No cards are due in this deck.".to_string()),
            None => self.reload(),
        }
    }

    fn render_export_dialog(&mut self, ctx: &egui::Context) {
        let mut export_deck_index: Option<usize> = None;
        let mut should_cancel = false;

        egui::Window::new("Export Deck")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Select a deck to export:");
                ui.separator();

                for (i, deck) in self.decks.iter().enumerate() {
                    if ui
                        .button(format!("{} ({} cards)", deck.name, deck.cards.len()))
                        .clicked()
                    {
                        export_deck_index = Some(i);
                    }
                }

                ui.separator();
                if ui.button("Cancel").clicked() {
                    should_cancel = true;
                }
            });

        if let Some(i) = export_deck_index {
            self.handle_export(i);
        }
        if should_cancel {
            self.show_export_dialog = false;
        }
    }

    fn render_delete_dialog(&mut self, ctx: &egui::Context, deck_id: &str) {
        let Some(deck) = self.decks.iter().find(|d| d.id == deck_id) else {
            self.pending_deck_delete = None;
            return;
        };
        let prompt = format!(
            "Are you sure you want to delete \"{}\"? This will delete all {} cards in this deck.",
            deck.name,
            deck.cards.len()
        );
        let mut confirmed = false;
        let mut cancelled = false;

        egui::Window::new("Delete Deck")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(prompt);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                    if ui.button("Delete").clicked() {
                        confirmed = true;
                    }
                });
            });

        if confirmed {
            let deleted = self.store.delete_deck(deck_id);
            self.report(deleted);
            self.reload();
        }
        if confirmed || cancelled {
            self.pending_deck_delete = None;
        }
    }

    /// Handles deck export to JSON file
    fn handle_export(&mut self, deck_index: usize) {
        if let Some(deck) = self.decks.get(deck_index) {
            if let Some(path) = rfd::FileDialog::new()
                .set_file_name(format!("{}.json", deck.name))
                .add_filter("JSON files", &["json"])
                .save_file()
            {
                self.message = Some(match export_json_to_path(deck, &path) {
                    Ok(_) => format!("Deck '{}' exported successfully!", deck.name),
                    Err(e) => format!("Export failed: {}", e),
                });
            }
        }
        self.show_export_dialog = false;
    }

    /// Handles deck import from JSON file
    fn handle_import(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };

        let deck = match import_json(&path) {
            Ok(deck) => deck,
            Err(e) => {
                self.message = Some(format!(
                    "Import failed: {}\n\nPlease check if the file has correct structure:\n{{\n  \"name\": \"Deck Name\",\n  \"cards\": [{{ \"front\": \"...\", \"back\": \"...\" }}]\n}}",
                    e
                ));
                return;
            }
        };

        let imported = self.store.import_deck(deck);
        if let Some(deck) = self.report(imported) {
            self.message = Some(format!(
                "Deck '{}' imported successfully with {} cards!",
                deck.name,
                deck.cards.len()
            ));
        }
        self.reload();
    }
}
