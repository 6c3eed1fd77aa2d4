use crate::fault::{Fault, FaultKind};
use crate::outcome::{Outcome, Report};
use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, catch_unwind, AssertUnwindSafe};
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A zero-argument operation that may fail. `Fn` so a catalogue can run more than once.
pub type Action = Box<dyn Fn() -> Result<(), Fault>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("scenario name must not be empty")]
    EmptyName,
}

// =============================================================================
// Scenario and catalogue
// =============================================================================

/// A named demonstration of one fault-triggering action.
pub struct Scenario {
    name: String,
    action: Action,
}

impl Scenario {
    pub fn new<F>(name: impl Into<String>, action: F) -> Result<Self, CatalogueError>
    where
        F: Fn() -> Result<(), Fault> + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogueError::EmptyName);
        }
        Ok(Self {
            name,
            action: Box::new(action),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the action directly, with no boundary around it.
    pub fn run(&self) -> Result<(), Fault> {
        (self.action)()
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario").field("name", &self.name).finish()
    }
}

/// Fixed, ordered list of scenarios. Only a [`CatalogueBuilder`] can make one.
#[derive(Debug, Default)]
pub struct Catalogue {
    scenarios: Vec<Scenario>,
}

impl Catalogue {
    pub fn builder() -> CatalogueBuilder {
        CatalogueBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(Scenario::name).collect()
    }
}

#[derive(Debug, Default)]
pub struct CatalogueBuilder {
    scenarios: Vec<Scenario>,
}

impl CatalogueBuilder {
    pub fn new() -> Self {
        Self {
            scenarios: Vec::new(),
        }
    }

    /// Append a scenario. Duplicate names are allowed and run independently.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        action: F,
    ) -> Result<&mut Self, CatalogueError>
    where
        F: Fn() -> Result<(), Fault> + 'static,
    {
        self.scenarios.push(Scenario::new(name, action)?);
        Ok(self)
    }

    pub fn build(self) -> Catalogue {
        Catalogue {
            scenarios: self.scenarios,
        }
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Runs every scenario of a catalogue, each inside its own fault boundary.
pub struct Runner {
    catalogue: Catalogue,
}

impl Runner {
    pub fn new(catalogue: Catalogue) -> Self {
        Self { catalogue }
    }

    /// Run one scenario. Faults and panics both end up in the outcome.
    pub fn run_one(scenario: &Scenario) -> Outcome {
        debug!(scenario = scenario.name(), "running scenario");

        match contain(|| scenario.run()) {
            Ok(Ok(())) => {
                info!(scenario = scenario.name(), "completed without fault");
                Outcome::completed(scenario.name())
            }
            Ok(Err(fault)) => {
                info!(
                    scenario = scenario.name(),
                    kind = %fault.kind(),
                    "fault contained"
                );
                Outcome::faulted(scenario.name(), fault)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(scenario = scenario.name(), %message, "panic contained");
                Outcome::faulted(scenario.name(), Fault::new(FaultKind::Panic, message))
            }
        }
    }

    /// One outcome per scenario, in registration order.
    pub fn run_all(&self) -> Vec<Outcome> {
        self.catalogue.iter().map(Self::run_one).collect()
    }

    pub fn report(&self) -> Report {
        Report::from_outcomes(self.run_all())
    }
}

thread_local! {
    static CONTAINING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wrap the current panic hook once so it stays silent on threads that are
/// inside a scenario boundary. Other panics still reach the previous hook.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !CONTAINING.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

fn contain<T>(f: impl FnOnce() -> T) -> std::thread::Result<T> {
    install_quiet_hook();
    let outer = CONTAINING.with(|flag| flag.replace(true));
    let result = catch_unwind(AssertUnwindSafe(f));
    CONTAINING.with(|flag| flag.set(outer));
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "scenario panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn divide(lhs: i32, rhs: i32) -> Result<(), Fault> {
        lhs.checked_div(rhs)
            .map(|_| ())
            .ok_or_else(|| Fault::new(FaultKind::InvalidArithmetic, "attempt to divide by zero"))
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let mut builder = CatalogueBuilder::new();
        assert_eq!(
            builder.register("", || Ok(())).unwrap_err(),
            CatalogueError::EmptyName
        );
        assert_eq!(
            builder.register("   ", || Ok(())).unwrap_err(),
            CatalogueError::EmptyName
        );
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_register_chains_in_order() {
        let mut builder = Catalogue::builder();
        builder
            .register("first", || Ok(()))
            .unwrap()
            .register("second", || Ok(()))
            .unwrap();
        let catalogue = builder.build();
        assert_eq!(catalogue.names(), vec!["first", "second"]);
    }

    #[test]
    fn test_single_divide_by_zero_scenario() {
        let mut builder = CatalogueBuilder::new();
        builder.register("divide-by-zero", || divide(10, 0)).unwrap();
        let outcomes = Runner::new(builder.build()).run_all();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].kind(), Some(FaultKind::InvalidArithmetic));
        assert!(outcomes[0].message().unwrap().contains("divide by zero"));
    }

    #[test]
    fn test_fault_does_not_stop_next_scenario() {
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);

        let mut builder = CatalogueBuilder::new();
        builder
            .register("fails", || Err(Fault::new(FaultKind::Io, "boom")))
            .unwrap()
            .register("after", move || {
                flag.set(true);
                Ok(())
            })
            .unwrap();
        let outcomes = Runner::new(builder.build()).run_all();

        assert!(ran.get());
        assert_eq!(outcomes[0].kind(), Some(FaultKind::Io));
        assert_eq!(outcomes[1], Outcome::completed("after"));
    }

    #[test]
    fn test_panic_is_contained() {
        let mut builder = CatalogueBuilder::new();
        builder
            .register("panics", || panic!("index out of bounds"))
            .unwrap()
            .register("after-panic", || Ok(()))
            .unwrap();
        let outcomes = Runner::new(builder.build()).run_all();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].kind(), Some(FaultKind::Panic));
        assert_eq!(outcomes[0].message(), Some("index out of bounds"));
        assert_eq!(outcomes[1], Outcome::completed("after-panic"));
    }

    #[test]
    fn test_panic_with_formatted_payload() {
        let scenario = Scenario::new("formatted", || panic!("bad value: {}", 7)).unwrap();
        let outcome = Runner::run_one(&scenario);
        assert_eq!(outcome.message(), Some("bad value: 7"));
    }

    #[test]
    fn test_duplicate_names_run_independently() {
        let count = Rc::new(Cell::new(0));
        let mut builder = CatalogueBuilder::new();
        for _ in 0..2 {
            let count = Rc::clone(&count);
            builder
                .register("same", move || {
                    count.set(count.get() + 1);
                    Ok(())
                })
                .unwrap();
        }
        let outcomes = Runner::new(builder.build()).run_all();

        assert_eq!(count.get(), 2);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.scenario() == "same"));
    }

    #[test]
    fn test_run_all_twice_gives_same_kinds() {
        let mut builder = CatalogueBuilder::new();
        builder
            .register("a", || divide(1, 0))
            .unwrap()
            .register("b", || Ok(()))
            .unwrap();
        let runner = Runner::new(builder.build());

        let first = runner.report();
        let second = runner.report();
        assert_eq!(first.kinds(), second.kinds());
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_catalogue_runs_nothing() {
        let runner = Runner::new(Catalogue::default());
        assert!(runner.run_all().is_empty());
    }

    #[test]
    fn test_boundary_flag_reset_after_panic() {
        let scenario = Scenario::new("quiet", || panic!("kept out of stderr")).unwrap();

        assert!(!CONTAINING.with(Cell::get));
        let first = Runner::run_one(&scenario);
        assert!(!CONTAINING.with(Cell::get));
        let second = Runner::run_one(&scenario);

        assert_eq!(first.kind(), Some(FaultKind::Panic));
        assert_eq!(first, second);
    }

    #[test]
    fn test_nested_boundary_restores_outer_flag() {
        let inner_seen = contain(|| {
            let inner = contain(|| CONTAINING.with(Cell::get)).unwrap();
            (inner, CONTAINING.with(Cell::get))
        })
        .unwrap();

        assert_eq!(inner_seen, (true, true));
        assert!(!CONTAINING.with(Cell::get));
    }
}
