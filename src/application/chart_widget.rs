// Chart widget - one dataset, an overview viewport and a detail viewport
use crate::domain::dashboard::ChartBlock;
use crate::domain::gesture::{EventResponse, GestureInterpreter, InputEvent};
use crate::domain::sample::Sample;
use crate::domain::ticks::generate_ticks;
use crate::domain::window::{Viewport, Window};
use crate::infrastructure::config::WidgetProfile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartView {
    /// Compact card on the dashboard grid; a click opens the detail view
    #[default]
    Overview,
    /// Full-screen modal
    Detail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStyle {
    pub name: String,
    pub color: String,
}

/// Everything a rendering surface needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub chart_id: usize,
    pub view: ChartView,
    pub title: String,
    pub unit: Option<String>,
    pub height_px: u32,
    pub y_axis_domain: (f64, f64),
    pub series: Vec<SeriesStyle>,
    pub window: Window,
    pub visible: Vec<Sample>,
    pub ticks: Vec<String>,
    pub is_zoomed: bool,
    /// Pointer held down on the chart; surfaces show a grabbing cursor
    pub dragging: bool,
    pub no_data: bool,
}

/// Viewport plus gesture state for a single on-screen instance of a chart.
#[derive(Debug, Clone)]
struct ViewportInstance {
    profile: WidgetProfile,
    viewport: Viewport,
    gestures: GestureInterpreter,
}

impl ViewportInstance {
    fn new(profile: WidgetProfile, len: usize) -> Self {
        Self {
            gestures: GestureInterpreter::new(profile.pan_sensitivity),
            viewport: Viewport::new(len),
            profile,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartWidget {
    block: ChartBlock,
    palette: Arc<[String]>,
    overview: ViewportInstance,
    detail: ViewportInstance,
}

impl ChartWidget {
    pub fn new(
        block: ChartBlock,
        overview: WidgetProfile,
        detail: WidgetProfile,
        palette: Arc<[String]>,
    ) -> Self {
        let len = block.dataset.len();
        Self {
            block,
            palette,
            overview: ViewportInstance::new(overview, len),
            detail: ViewportInstance::new(detail, len),
        }
    }

    pub fn id(&self) -> usize {
        self.block.id
    }

    pub fn title(&self) -> &str {
        &self.block.spec.title
    }

    pub fn sample_count(&self) -> usize {
        self.block.dataset.len()
    }

    /// Swap in freshly fetched data.
    ///
    /// Both windows return to full view when the sample count changed.
    /// Returns whether that happened.
    pub fn replace_dataset(&mut self, block: ChartBlock) -> bool {
        let len = block.dataset.len();
        self.block = block;
        let overview_reset = self.overview.viewport.set_len(len);
        let detail_reset = self.detail.viewport.set_len(len);
        overview_reset || detail_reset
    }

    pub fn handle_input(
        &mut self,
        view: ChartView,
        event: &InputEvent,
        on_activate: &mut dyn FnMut(),
    ) -> EventResponse {
        // Already the detail view, there is nothing further to open
        let on_activate = match view {
            ChartView::Overview => Some(on_activate),
            ChartView::Detail => None,
        };
        let instance = self.instance_mut(view);
        instance
            .gestures
            .handle(event, &mut instance.viewport, on_activate)
    }

    pub fn frame(&self, view: ChartView) -> ChartFrame {
        let instance = self.instance(view);
        let visible = instance.viewport.visible_slice(self.block.dataset.samples());

        ChartFrame {
            chart_id: self.block.id,
            view,
            title: self.block.spec.title.clone(),
            unit: self.block.spec.unit.clone(),
            height_px: instance.profile.height_px,
            y_axis_domain: self.block.spec.y_axis_domain,
            series: self.series_styles(&instance.profile),
            window: instance.viewport.window(),
            visible: visible.to_vec(),
            ticks: generate_ticks(visible),
            is_zoomed: instance.viewport.is_zoomed(),
            dragging: instance.gestures.drag_state().is_dragging,
            no_data: instance.viewport.is_degenerate(),
        }
    }

    fn series_styles(&self, profile: &WidgetProfile) -> Vec<SeriesStyle> {
        let mut names = self.block.series_names();
        if self.block.spec.series.is_empty() {
            if let Some(max) = profile.max_series {
                names.truncate(max);
            }
        }

        let colors: &[String] = if self.block.spec.colors.is_empty() {
            &self.palette
        } else {
            &self.block.spec.colors
        };

        names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| SeriesStyle {
                color: colors
                    .get(idx % colors.len().max(1))
                    .cloned()
                    .unwrap_or_default(),
                name,
            })
            .collect()
    }

    fn instance(&self, view: ChartView) -> &ViewportInstance {
        match view {
            ChartView::Overview => &self.overview,
            ChartView::Detail => &self.detail,
        }
    }

    fn instance_mut(&mut self, view: ChartView) -> &mut ViewportInstance {
        match view {
            ChartView::Overview => &mut self.overview,
            ChartView::Detail => &mut self.detail,
        }
    }
}
