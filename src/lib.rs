#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;

use std::fmt;

use geom::{CrossSection, LoftModel, LoftStrategy, Point2, would_cause_self_intersection};
use serde::Serialize;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize)]
struct SegmentExport {
    index: usize,
    locked: bool,
    faces: Vec<geom::Face>,
}

#[derive(Debug, Serialize)]
struct FacesExport {
    segments: Vec<SegmentExport>,
    caps: Vec<geom::Face>,
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    model: LoftModel,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            model: LoftModel::default(),
        }
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Kies de loft-strategie voor niet-vergrendelde segmenten
    /// (`perimeter-walk` of `anchor-resample`).
    #[wasm_bindgen]
    pub fn set_strategy(&mut self, name: &str) -> Result<(), JsValue> {
        let strategy: LoftStrategy = name.parse().map_err(to_js_error)?;
        debug_log!("strategie ingesteld op {strategy}");
        self.model.set_strategy(strategy);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn strategy(&self) -> String {
        self.model.options().strategy.name().to_string()
    }

    /// Zet de onder- en bovenkap aan of uit.
    #[wasm_bindgen]
    pub fn set_caps(&mut self, bottom: bool, top: bool) {
        let mut options = *self.model.options();
        options.cap_bottom = bottom;
        options.cap_top = top;
        self.model.set_options(options);
    }

    /// Stel de maximale ankerafstand in voor `anchor-resample`.
    #[wasm_bindgen]
    pub fn set_anchor_epsilon(&mut self, epsilon: f64) -> Result<(), JsValue> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(js_error("ankerafstand moet een eindig, niet-negatief getal zijn"));
        }
        let mut options = *self.model.options();
        options.anchor_epsilon = epsilon;
        self.model.set_options(options);
        Ok(())
    }

    /// Voeg een doorsnede toe als platte lijst `[x0, y0, x1, y1, ...]` op de
    /// gegeven hoogte. Geeft de index van de doorsnede terug.
    #[wasm_bindgen]
    pub fn add_section(&mut self, points: Vec<f64>, height: f64) -> Result<usize, JsValue> {
        if !height.is_finite() {
            return Err(js_error("hoogte moet een eindig getal zijn"));
        }
        let points = points_from_flat(&points).map_err(|err| js_error(&err))?;
        let index = self.model.add_section(CrossSection::new(points, height));
        debug_log!("doorsnede {index} toegevoegd op hoogte {height}");
        Ok(index)
    }

    #[wasm_bindgen]
    pub fn remove_section(&mut self, index: usize) -> Result<(), JsValue> {
        self.model.remove_section(index).map_err(to_js_error)?;
        Ok(())
    }

    /// Vervang de schets van een doorsnede. Vergrendelde buursegmenten volgen
    /// de nieuwe posities zonder hertriangulatie.
    #[wasm_bindgen]
    pub fn update_section(&mut self, index: usize, points: Vec<f64>) -> Result<(), JsValue> {
        let points = points_from_flat(&points).map_err(|err| js_error(&err))?;
        self.model.set_section_points(index, points).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn section_count(&self) -> usize {
        self.model.section_count()
    }

    #[wasm_bindgen]
    pub fn segment_count(&self) -> usize {
        self.model.segment_count()
    }

    /// Verplaats een hoekpunt. Geeft `false` terug als de verplaatsing de
    /// schets zichzelf zou laten snijden; er verandert dan niets.
    #[wasm_bindgen]
    pub fn move_vertex(&mut self, section: usize, vertex: usize, x: f64, y: f64) -> Result<bool, JsValue> {
        if !x.is_finite() || !y.is_finite() {
            return Err(js_error("coördinaten moeten eindige getallen zijn"));
        }
        self.model
            .move_vertex(section, vertex, Point2::new(x, y))
            .map_err(to_js_error)
    }

    /// Controleer zonder iets te wijzigen of een verplaatsing de schets
    /// zichzelf zou laten snijden.
    #[wasm_bindgen]
    pub fn would_self_intersect(&self, section: usize, vertex: usize, x: f64, y: f64) -> Result<bool, JsValue> {
        let sketch = self
            .model
            .sections()
            .get(section)
            .ok_or_else(|| js_error("onbekende doorsnede"))?;
        Ok(would_cause_self_intersection(&sketch.points, vertex, Point2::new(x, y)))
    }

    #[wasm_bindgen]
    pub fn lock_segment(&mut self, index: usize) -> Result<(), JsValue> {
        self.model.lock_segment(index).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn unlock_segment(&mut self, index: usize) -> Result<(), JsValue> {
        self.model.unlock_segment(index).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn is_segment_locked(&self, index: usize) -> Result<bool, JsValue> {
        self.model.is_segment_locked(index).map_err(to_js_error)
    }

    /// Haal alle vlakken op, per segment gegroepeerd, plus de kappen.
    /// Elk vlak is een lijst van 3 of 4 punten `[x, y, z]`.
    #[wasm_bindgen]
    pub fn get_faces(&self) -> Result<JsValue, JsValue> {
        let export = self.faces_export();
        serde_wasm_bindgen::to_value(&export).map_err(to_js_error)
    }

    /// Sla het model op als JSON, inclusief vergrendelde segmenten.
    #[wasm_bindgen]
    pub fn save_model(&self) -> Result<String, JsValue> {
        self.model.to_json().map_err(to_js_error)
    }

    /// Laad een eerder opgeslagen model. De huidige strategie en kapinstellingen
    /// blijven behouden.
    #[wasm_bindgen]
    pub fn load_model(&mut self, json: &str) -> Result<(), JsValue> {
        let model = LoftModel::from_json(json, *self.model.options()).map_err(to_js_error)?;
        debug_log!(
            "model geladen: {} doorsneden, {} segmenten",
            model.section_count(),
            model.segment_count()
        );
        self.model = model;
        Ok(())
    }
}

impl Engine {
    /// The lofted model behind this engine.
    #[must_use]
    pub fn model(&self) -> &LoftModel {
        &self.model
    }

    fn faces_export(&self) -> FacesExport {
        let segments = self
            .model
            .segment_bands()
            .into_iter()
            .enumerate()
            .map(|(index, faces)| SegmentExport {
                index,
                locked: self.model.is_segment_locked(index).unwrap_or(false),
                faces,
            })
            .collect();

        let (mut caps, top) = self.model.caps();
        caps.extend(top);
        FacesExport { segments, caps }
    }
}

/// Parse a flat `[x0, y0, x1, y1, ...]` list into sketch points.
fn points_from_flat(flat: &[f64]) -> Result<Vec<Point2>, String> {
    if flat.len() % 2 != 0 {
        return Err(format!("puntenlijst heeft een oneven lengte ({})", flat.len()));
    }
    let points: Vec<Point2> = flat
        .chunks_exact(2)
        .map(|xy| Point2::new(xy[0], xy[1]))
        .collect();
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(format!("punt {index} bevat een niet-eindige coördinaat"));
    }
    Ok(points)
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen::JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
