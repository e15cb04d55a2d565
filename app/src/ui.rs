use crate::app::{DashboardApp, LoadedData, Mode};
use crate::charts;

use adclick::{Column, EdaChart, Verdict};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

/// Draws the left-side panel with the mode selector.
pub fn draw_side_panel(app: &mut DashboardApp, ctx: &egui::Context) {
    egui::SidePanel::left("controls_panel").show(ctx, |ui| {
        ui.heading(&app.config.ui.window_title);
        ui.separator();

        draw_mode_selector(app, ui);
        ui.separator();

        if ui.button("Reload data").clicked() {
            app.reload();
        }
        if let Ok(data) = &app.data {
            ui.label(format!(
                "{} rows from {}",
                data.dataset.len(),
                data.dataset.source_name()
            ));
        }
    });
}

/// Draws the view of the selected mode, or only an error if the data is unusable.
pub fn draw_central_panel(app: &mut DashboardApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        if let Err(message) = &app.data {
            draw_error(ui, "The dataset could not be loaded", message);
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match app.mode {
                Mode::Home => draw_home(app, ui),
                Mode::Eda => draw_eda(app, ui),
                Mode::Ml => draw_ml(app, ui),
            });
    });
}

fn draw_mode_selector(app: &mut DashboardApp, ui: &mut Ui) {
    ui.label("Pick a choice:");
    let mut selected = app.mode;

    egui::ComboBox::from_id_salt("mode_selector")
        .selected_text(selected.label())
        .show_ui(ui, |ui| {
            for mode in Mode::ALL {
                ui.selectable_value(&mut selected, mode, mode.label());
            }
        });

    app.set_mode(selected);
}

fn draw_home(app: &DashboardApp, ui: &mut Ui) {
    let Ok(data) = &app.data else {
        return;
    };
    ui.heading("📊 Facebook Ads Analytics App");
    ui.label(
        "This dashboard visualizes user behavior and predicts whether a user will click on a Facebook ad.",
    );
    ui.add_space(8.0);

    draw_preview_table(data, app.config.ui.preview_rows, ui);
    ui.label(format!(
        "Showing {} of {} rows",
        data.dataset.head(app.config.ui.preview_rows).len(),
        data.dataset.len()
    ));
}

fn draw_preview_table(data: &LoadedData, rows: usize, ui: &mut Ui) {
    let head = data.dataset.head(rows);

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(TableColumn::auto().at_least(40.0))
        .columns(TableColumn::auto().at_least(140.0), Column::ALL.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("");
            });
            for name in data.dataset.columns() {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for (index, record) in head.iter().enumerate() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(index.to_string());
                    });
                    for column in Column::ALL {
                        row.col(|ui| {
                            ui.label(record.cell(column));
                        });
                    }
                });
            }
        });
}

fn draw_eda(app: &DashboardApp, ui: &mut Ui) {
    let Ok(data) = &app.data else {
        return;
    };
    let eda = &data.eda;

    ui.heading("📈 Exploratory Data Analysis (EDA)");
    ui.label(
        "Gain insights into how users interact with ads based on Time Spent on Site, Salary, and whether they Clicked.",
    );

    chart_section(ui, EdaChart::Scatter, |ui| {
        charts::scatter_plot(ui, &eda.scatter)
    });

    ui.columns(2, |columns| {
        chart_section(&mut columns[0], EdaChart::TimeHistogram, |ui| {
            charts::histogram_plot(ui, &eda.histogram)
        });
        chart_section(&mut columns[1], EdaChart::ClickShare, |ui| {
            charts::pie_chart(ui, &eda.pie)
        });
    });

    chart_section(ui, EdaChart::SalaryViolin, |ui| {
        charts::violin_plot(ui, &eda.violin)
    });
}

/// Heading, chart title, the chart itself and its commentary.
fn chart_section(ui: &mut Ui, chart: EdaChart, add_chart: impl FnOnce(&mut Ui)) {
    ui.add_space(16.0);
    ui.label(RichText::new(chart.heading()).size(18.0).strong());
    ui.label(RichText::new(chart.title()).italics());
    add_chart(ui);
    charts::insight_box(ui, &chart.insight());
}

fn draw_ml(app: &mut DashboardApp, ui: &mut Ui) {
    ui.heading("🤖 Ads Click Prediction Model");
    ui.label("Enter the user inputs below to predict if they would click an ad:");
    ui.add_space(8.0);

    app.ensure_model();
    if let Some(Err(message)) = &app.model {
        draw_error(ui, "The model artifact could not be loaded", message);
        return;
    }

    let mut changed = false;
    egui::Grid::new("prediction_inputs")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("⏱ Time Spent on Website (minutes)");
            changed |= ui
                .add(egui::DragValue::new(&mut app.time_input).speed(0.1))
                .changed();
            ui.end_row();

            ui.label("💰 User Salary ($)");
            changed |= ui
                .add(egui::DragValue::new(&mut app.salary_input).speed(100.0))
                .changed();
            ui.end_row();
        });
    if changed {
        app.inputs_changed();
    }

    if ui.button("Predict").clicked() {
        app.predict();
    }

    match &app.last_verdict {
        Some(Ok(verdict)) => draw_verdict(ui, *verdict),
        Some(Err(message)) => draw_error(ui, "Prediction failed", message),
        None => {}
    }

    if let Some(Ok(model)) = &app.model {
        ui.add_space(16.0);
        ui.collapsing("Model details", |ui| {
            let report = model.report();
            ui.label(format!(
                "Trained on {} rows (accuracy {:.1}%)",
                report.train_rows,
                report.train_accuracy * 100.0
            ));
            if let Some(accuracy) = report.test_accuracy {
                ui.label(format!(
                    "Evaluated on {} held-out rows (accuracy {:.1}%)",
                    report.test_rows,
                    accuracy * 100.0
                ));
            }
        });
    }
}

fn draw_verdict(ui: &mut Ui, verdict: Verdict) {
    let (fill, text) = if verdict.is_likely() {
        (Color32::from_rgb(223, 245, 228), Color32::from_rgb(22, 110, 44))
    } else {
        (Color32::from_rgb(253, 228, 228), Color32::from_rgb(160, 32, 32))
    };
    message_frame(ui, fill, |ui| {
        ui.label(RichText::new(verdict.message()).color(text).strong());
    });
}

fn draw_error(ui: &mut Ui, title: &str, message: &str) {
    let text = Color32::from_rgb(160, 32, 32);
    message_frame(ui, Color32::from_rgb(253, 228, 228), |ui| {
        ui.label(RichText::new(title).color(text).strong());
        ui.label(RichText::new(message).color(text));
    });
}

fn message_frame(ui: &mut Ui, fill: Color32, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::group(ui.style()).fill(fill).show(ui, |ui| {
        ui.set_width(ui.available_width());
        add_contents(ui);
    });
}
