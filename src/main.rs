mod app;
use study_tracker::*;

use app::MyApp;
use std::path::Path;

/// Seeds a sample deck the first time the app runs.
fn seed_sample_deck(store: &Store) -> Result<(), ReviewError> {
    if !store.get_decks()?.is_empty() {
        return Ok(());
    }

    let deck = store.create_deck("Polish Vocabulary")?;
    let now = SystemClock.now();
    store.add_card(&deck.id, "cześć", "hello", now)?;
    store.add_card(&deck.id, "dziękuję", "thank you", now)?;
    store.add_card(&deck.id, "proszę", "please", now)?;

    log::info!("Sample data created");
    Ok(())
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load(Path::new(config::CONFIG_FILE)).expect("Failed to load settings");
    let conn = database::db::init_database(&config.database_path)
        .expect("Failed to initialize database");
    let store = Store::new(conn);

    seed_sample_deck(&store).expect("Failed to create sample data");

    let decks = store.get_decks().expect("Failed to load decks from database");
    log::info!("Loaded {} decks from database", decks.len());
    for deck in &decks {
        log::info!("  - {} ({} cards)", deck.name, deck.cards.len());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height]),
        ..Default::default()
    };
    eframe::run_native(
        "Study Tracker",
        options,
        Box::new(|_cc| Ok(Box::new(MyApp::new(store)))),
    )
}
