use crate::ui;

use adclick::{ClickModel, Config, Dataset, EdaReport, Verdict};
use eframe::egui::{self, Color32};
use eframe::{App, Frame};
use tracing::{info, warn};

/// The three views picked from the side panel.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mode {
    Home,
    Eda,
    Ml,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Home, Mode::Eda, Mode::Ml];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Home => "Home",
            Mode::Eda => "EDA",
            Mode::Ml => "ML",
        }
    }
}

/// The dataset together with the chart data derived from it.
pub struct LoadedData {
    pub dataset: Dataset,
    pub eda: EdaReport,
}

impl LoadedData {
    pub fn new(dataset: Dataset) -> Self {
        let eda = EdaReport::build(&dataset);
        Self { dataset, eda }
    }
}

/// The main application struct.
/// It holds the high-level state and delegates drawing to the `ui` module.
pub struct DashboardApp {
    // --- Core State ---
    pub config: Config,
    /// `Err` holds the message of a failed reload; nothing else is drawn then.
    pub data: Result<LoadedData, String>,
    /// Loaded on the first visit to the ML view and kept until the next reload.
    pub model: Option<Result<ClickModel, String>>,

    // --- UI State ---
    pub mode: Mode,
    pub time_input: f64,
    pub salary_input: f64,
    /// Result of the last press of "Predict"; cleared when an input changes.
    pub last_verdict: Option<Result<Verdict, String>>,
}

impl DashboardApp {
    /// Creates the application around an already loaded dataset.
    pub fn new(config: Config, dataset: Dataset) -> Self {
        Self {
            config,
            data: Ok(LoadedData::new(dataset)),
            model: None,
            mode: Mode::Home,
            time_input: 0.0,
            salary_input: 0.0,
            last_verdict: None,
        }
    }

    /// Switches view. Leaving the ML view forgets the last verdict, as the
    /// button press that produced it belongs to that visit.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            info!(mode = mode.label(), "switching view");
            self.mode = mode;
            self.last_verdict = None;
        }
    }

    /// Loads the model artifact if it has not been attempted since the last reload.
    pub fn ensure_model(&mut self) {
        if self.model.is_none() {
            let path = &self.config.model.artifact_path;
            let model = ClickModel::load(path).map_err(|e| {
                warn!(error = %e, "model artifact unavailable");
                e.to_string()
            });
            self.model = Some(model);
        }
    }

    /// Must be called whenever one of the numeric inputs is edited.
    pub fn inputs_changed(&mut self) {
        self.last_verdict = None;
    }

    /// Runs the classifier on the current inputs.
    pub fn predict(&mut self) {
        self.ensure_model();
        let verdict = match &self.model {
            Some(Ok(model)) => model
                .predict(self.time_input, self.salary_input)
                .map_err(|e| e.to_string()),
            Some(Err(e)) => Err(e.clone()),
            None => Err("model not loaded".to_string()),
        };
        self.last_verdict = Some(verdict);
    }

    /// Re-reads the dataset and forgets the cached model.
    pub fn reload(&mut self) {
        info!(path = %self.config.data.csv_path.display(), "reloading data");
        self.data = Dataset::load(&self.config.data.csv_path)
            .map(LoadedData::new)
            .map_err(|e| {
                warn!(error = %e, "reload failed");
                e.to_string()
            });
        self.model = None;
        self.last_verdict = None;
    }

    /// Colour used for a `Clicked` label across the charts that color by label.
    pub fn label_color(clicked: bool) -> Color32 {
        if clicked {
            ecolor::hex_color!("#ef553b")
        } else {
            ecolor::hex_color!("#636efa")
        }
    }
}

impl App for DashboardApp {
    /// The main update loop, called by eframe on every frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        ui::draw_side_panel(self, ctx);
        ui::draw_central_panel(self, ctx);
    }
}
