use ratatui::Frame;

use crate::app::{App, View};

/// A UI Screen boundary: responsible for rendering one view
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Survey screen - the question form
pub struct SurveyScreen;

impl Screen for SurveyScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        if let View::Survey(survey) = app.view() {
            f.render_widget(survey, f.area());
        }
    }
}

/// Results screen - muted form, replay trail and metrics panels
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        if let View::Results(results) = app.view() {
            f.render_widget(results, f.area());
        }
    }
}

/// Helper to construct the appropriate screen for the current view
pub fn current_screen(view: &View) -> Box<dyn Screen> {
    match view {
        View::Survey(_) => Box::new(SurveyScreen),
        View::Results(_) => Box::new(ResultsScreen),
    }
}
