//! In-memory collection of modules.
//!
//! The catalog is owned by whichever controller drives the UI; nothing here
//! is global. Modules are kept most-recently-created first.

use chrono::{TimeZone, Utc};
use tracing::{debug, info};

use crate::items::ItemList;
use crate::model::{Module, ModuleId, NewItem};

/// What an [`ModuleCatalog::upsert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// The set of modules known to the running program.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: Vec<Module>,
}

impl ModuleCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding `modules` in the given order.
    pub fn from_modules(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    /// A catalog pre-populated with two sample projects.
    pub fn with_demo_modules() -> Self {
        Self::from_modules(demo_modules())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Insert or replace a module, keyed by its id.
    ///
    /// An existing module keeps its position; a new one goes to the front.
    pub fn upsert(&mut self, module: Module) -> UpsertOutcome {
        if let Some(slot) = self.modules.iter_mut().find(|m| m.id == module.id) {
            debug!(module_id = %module.id, name = %module.name, "replacing module");
            *slot = module;
            UpsertOutcome::Replaced
        } else {
            info!(module_id = %module.id, name = %module.name, "adding module");
            self.modules.insert(0, module);
            UpsertOutcome::Inserted
        }
    }
}

fn demo_item(component: &str, value: &str) -> NewItem {
    NewItem {
        component: component.to_string(),
        value: value.to_string(),
        total_quantity: 1,
        pcb_quantity: 1,
    }
}

/// Sample projects shown on first launch.
pub fn demo_modules() -> Vec<Module> {
    let mut printer_items = ItemList::new();
    printer_items.merge([
        demo_item("Thermal Head", "FTP-628"),
        demo_item("Stepper Motor", "NEMA 14"),
        demo_item("Microcontroller", "STM32F103"),
    ]);

    let printer = Module {
        id: ModuleId::new(),
        name: "3 Inch Thermal Printer".to_string(),
        version: "V3 R1".to_string(),
        items: printer_items,
        last_modified: Utc
            .with_ymd_and_hms(2023, 10, 25, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
    };

    let adapter = Module {
        id: ModuleId::new(),
        name: "Bluetooth Module Adapter".to_string(),
        version: "V1.2".to_string(),
        items: ItemList::new(),
        last_modified: Utc
            .with_ymd_and_hms(2023, 10, 20, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
    };

    vec![printer, adapter]
}
