use std::cell::Cell;

use crate::runtime::current_instance;

thread_local! {
    static INSPECTOR_ENABLED: Cell<bool> = const { Cell::new(false) };
}

/// Devtools switch. While disabled, `use_debug_value` never formats anything.
pub struct Inspector;

impl Inspector {
    pub fn enable() {
        INSPECTOR_ENABLED.with(|e| e.set(true));
    }

    pub fn disable() {
        INSPECTOR_ENABLED.with(|e| e.set(false));
    }

    pub fn is_enabled() -> bool {
        INSPECTOR_ENABLED.with(|e| e.get())
    }
}

/// Labels the current instance for the inspector. `format` only runs while
/// the inspector is enabled.
pub fn use_debug_value<V>(value: V, format: impl FnOnce(&V) -> String) {
    if !Inspector::is_enabled() {
        return;
    }
    if let Some(instance) = current_instance() {
        let label = format(&value);
        log::trace!("debug value on '{}': {label}", instance.name());
        instance.push_debug_label(label);
    }
}
