//! The command dispatcher: decodes host calls and drives the session registry.

use std::path::PathBuf;

use crate::config::{ConfigSource, DEFAULT_CONFIG_ROOT, JsonConfigSource};
use crate::dispatch::command::Command;
use crate::dispatch::reply::{Reply, STATUS_SUCCESS};
use crate::engine::{BuiltinFactory, EngineFactory, NoSelector, RegionSelector};
use crate::error::{CommandError, Result};
use crate::marshal::{
    HostArray, Region, decode_image, decode_region, decode_session_index, encode_region,
};
use crate::session::{SessionRegistry, TrackerSession};

/// Explicit command context: the session registry and the collaborators
/// sessions are built from.
///
/// Calls run one at a time to completion. A multi-threaded host must wrap
/// the whole dispatcher in a single lock.
pub struct Dispatcher {
    registry: SessionRegistry,
    factory: Box<dyn EngineFactory>,
    configs: Box<dyn ConfigSource>,
    selector: Box<dyn RegionSelector>,
    last_error: Option<String>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher with the built-in engines, JSON configuration and no selector.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a dispatcher with custom collaborators.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Sessions created so far.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Message of the most recent failed call, if the last call failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Raw host entry point: `args[0]` is the command name.
    ///
    /// Never fails; failures come back as a zero status plus a message.
    pub fn call(&mut self, args: &[HostArray], nargout: usize) -> Reply {
        let result = match args.split_first() {
            None => Err(CommandError::argument("not enough input arguments")),
            Some((name, rest)) => match name.as_text() {
                Some(command) => self.dispatch(command, rest, nargout),
                None => Err(CommandError::argument("the first argument must be a string")),
            },
        };
        self.finish(result)
    }

    /// Typed entry point with the status-plus-message surface of [`Dispatcher::call`].
    pub fn call_command(&mut self, command: &str, args: &[HostArray], nargout: usize) -> Reply {
        let result = self.dispatch(command, args, nargout);
        self.finish(result)
    }

    fn finish(&mut self, result: Result<Vec<HostArray>>) -> Reply {
        match result {
            Ok(outputs) => {
                self.last_error = None;
                Reply::success(outputs)
            }
            Err(err) => {
                let message = err.to_string();
                log::error!("{message}");
                self.last_error = Some(message.clone());
                Reply::failure(message)
            }
        }
    }

    /// Decode, validate and execute one command.
    ///
    /// All argument decoding happens before any session is touched, so a
    /// malformed call never leaves partial state behind.
    pub fn dispatch(
        &mut self,
        command: &str,
        args: &[HostArray],
        nargout: usize,
    ) -> Result<Vec<HostArray>> {
        let cmd = Command::parse(command)?;
        let spec = cmd.spec();
        spec.check(args.len(), nargout)?;

        let index = match spec.session_arg.and_then(|pos| args.get(pos)) {
            Some(arr) => Some(decode_session_index(arr)?),
            None => None,
        };

        match cmd {
            Command::Create => self.create(args.first()),
            Command::Initialize => {
                let frame = decode_image(&args[0])?;
                let region = match args.get(1) {
                    // An empty placeholder keeps the index position without a region.
                    Some(arr) if arr.numel() > 0 => Some(decode_region(arr)?),
                    _ => None,
                };
                if self.registry.is_empty() {
                    return Err(CommandError::NoSession);
                }
                let index = self.target(index)?;
                let selector = self.selector.as_mut();
                let session = self.registry.get_mut(index)?;
                let region = session.initialize(&frame, region, selector)?;
                Ok(region_outputs(&region))
            }
            Command::Update => {
                let frame = decode_image(&args[0])?;
                let index = self.target(index)?;
                let region = self.registry.get_mut(index)?.update(&frame)?;
                Ok(region_outputs(&region))
            }
            Command::SetRegion => {
                let region = decode_region(&args[0])?;
                let index = self.target(index)?;
                let region = self.registry.get_mut(index)?.set_region(&region)?;
                Ok(region_outputs(&region))
            }
            Command::Remove => {
                let index = self.target(index)?;
                let session = self.registry.remove(index)?;
                log::info!(
                    "removed {} tracker {index}, {} remaining",
                    session.engine_name(),
                    self.registry.count()
                );
                Ok(vec![HostArray::scalar(STATUS_SUCCESS)])
            }
        }
    }

    fn create(&mut self, root: Option<&HostArray>) -> Result<Vec<HostArray>> {
        let root = match root {
            Some(arr) => {
                let path = arr.as_text().ok_or_else(|| {
                    CommandError::argument("configuration root for creating tracker must be a string")
                })?;
                log::info!("reading configuration files from: {path}");
                PathBuf::from(path)
            }
            None => {
                log::info!("using default configuration folder: {DEFAULT_CONFIG_ROOT}");
                PathBuf::from(DEFAULT_CONFIG_ROOT)
            }
        };

        let config = self.configs.load(&root)?;
        let session = TrackerSession::create(self.factory.as_ref(), config)?;
        let engine = session.engine_name().to_string();
        let index = self.registry.create(session);
        log::info!("created {engine} tracker {index}");
        Ok(vec![HostArray::scalar(STATUS_SUCCESS)])
    }

    /// Resolve the session a call targets and make it the active one.
    ///
    /// An explicit index is sticky: later calls without one target it too.
    fn target(&mut self, index: Option<usize>) -> Result<usize> {
        let index = index.unwrap_or(self.registry.active());
        self.registry.select(index)?;
        Ok(index)
    }
}

fn region_outputs(region: &Region) -> Vec<HostArray> {
    vec![HostArray::scalar(STATUS_SUCCESS), encode_region(region)]
}

/// Builder for [`Dispatcher`] with injectable collaborators.
pub struct DispatcherBuilder {
    factory: Box<dyn EngineFactory>,
    configs: Box<dyn ConfigSource>,
    selector: Box<dyn RegionSelector>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            factory: Box::new(BuiltinFactory),
            configs: Box::new(JsonConfigSource),
            selector: Box::new(NoSelector),
        }
    }
}

impl DispatcherBuilder {
    /// Use `factory` to build engines and pipelines.
    pub fn factory<F: EngineFactory + 'static>(mut self, factory: F) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Use `configs` to load session configurations.
    pub fn config_source<C: ConfigSource + 'static>(mut self, configs: C) -> Self {
        self.configs = Box::new(configs);
        self
    }

    /// Use `selector` when `initialize` gets no region.
    pub fn selector<S: RegionSelector + 'static>(mut self, selector: S) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Finish with an empty registry.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            registry: SessionRegistry::new(),
            factory: self.factory,
            configs: self.configs,
            selector: self.selector,
            last_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::error::ConfigError;
    use std::path::Path;

    struct StaticConfig;

    impl ConfigSource for StaticConfig {
        fn load(&self, _root: &Path) -> Result<SessionConfig, ConfigError> {
            Ok(SessionConfig {
                tracker: "static".to_string(),
                ..SessionConfig::default()
            })
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::builder().config_source(StaticConfig).build()
    }

    fn gray(height: usize, width: usize) -> HostArray {
        HostArray::uint8(&[height, width], vec![0; height * width]).unwrap()
    }

    #[test]
    fn test_validation_precedes_mutation() {
        let mut d = dispatcher();
        d.dispatch("create", &[], 1).unwrap();

        // A double session index is rejected before the registry changes.
        let err = d
            .dispatch("remove", &[HostArray::scalar(0.0)], 1)
            .unwrap_err();
        assert!(matches!(err, CommandError::Format(_)));
        assert_eq!(d.registry().count(), 1);
    }

    #[test]
    fn test_initialize_without_session() {
        let mut d = dispatcher();
        let err = d.dispatch("initialize", &[gray(4, 4)], 2).unwrap_err();
        assert!(matches!(err, CommandError::NoSession));
    }

    #[test]
    fn test_create_rejects_non_text_root() {
        let mut d = dispatcher();
        let err = d.dispatch("create", &[HostArray::scalar(1.0)], 1).unwrap_err();
        assert!(matches!(err, CommandError::Argument(_)));
        assert!(d.registry().is_empty());
    }

    #[test]
    fn test_explicit_index_is_sticky() {
        let mut d = dispatcher();
        d.dispatch("create", &[], 1).unwrap();
        d.dispatch("create", &[], 1).unwrap();
        assert_eq!(d.registry().active(), 1);

        let region = encode_region(&Region::from_tlbr(0.0, 0.0, 2.0, 2.0));
        d.dispatch("initialize", &[gray(4, 4), region, HostArray::index(0)], 2)
            .unwrap();
        assert_eq!(d.registry().active(), 0);

        // No index: targets session 0, which is initialized.
        assert!(d.dispatch("update", &[gray(4, 4)], 2).is_ok());
    }

    /// Selector answering with a fixed region and counting its calls.
    struct FixedSelector {
        region: Region,
        calls: std::rc::Rc<std::cell::Cell<usize>>,
    }

    impl RegionSelector for FixedSelector {
        fn select(
            &mut self,
            _frame: &crate::marshal::Frame,
            _patch_size: usize,
        ) -> Result<Region, crate::error::AcquisitionError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.region)
        }
    }

    fn no_region() -> HostArray {
        HostArray::double(&[0, 0], vec![]).unwrap()
    }

    #[test]
    fn test_empty_region_slot_asks_selector() {
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let picked = Region::from_tlbr(1.0, 1.0, 3.0, 3.0);
        let mut d = Dispatcher::builder()
            .config_source(StaticConfig)
            .selector(FixedSelector {
                region: picked,
                calls: calls.clone(),
            })
            .build();
        d.dispatch("create", &[], 1).unwrap();
        d.dispatch("create", &[], 1).unwrap();

        let out = d
            .dispatch("initialize", &[gray(4, 4), no_region(), HostArray::index(0)], 2)
            .unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(out[1], encode_region(&picked));
        assert!(d.registry().get(0).unwrap().state().is_initialized());
        assert!(!d.registry().get(1).unwrap().state().is_initialized());
    }

    #[test]
    fn test_empty_region_slot_without_selector_fails() {
        let mut d = dispatcher();
        d.dispatch("create", &[], 1).unwrap();

        let err = d
            .dispatch("initialize", &[gray(4, 4), no_region(), HostArray::index(0)], 2)
            .unwrap_err();
        assert!(matches!(err, CommandError::Acquisition(_)));
        assert!(!d.registry().get(0).unwrap().state().is_initialized());
    }

    #[test]
    fn test_rejected_call_still_moves_active_index() {
        let mut d = dispatcher();
        d.dispatch("create", &[], 1).unwrap();
        d.dispatch("create", &[], 1).unwrap();
        assert_eq!(d.registry().active(), 1);

        let err = d
            .dispatch("update", &[gray(4, 4), HostArray::index(0)], 2)
            .unwrap_err();
        assert!(matches!(err, CommandError::NotInitialized { action: "updated" }));
        assert_eq!(d.registry().active(), 0);

        let region = encode_region(&Region::from_tlbr(0.0, 0.0, 2.0, 2.0));
        let err = d
            .dispatch("set_region", &[region, HostArray::index(1)], 2)
            .unwrap_err();
        assert!(matches!(err, CommandError::NotInitialized { action: "reset" }));
        assert_eq!(d.registry().active(), 1);

        // An out-of-range index is rejected before it can become active.
        let err = d
            .dispatch("update", &[gray(4, 4), HostArray::index(5)], 2)
            .unwrap_err();
        assert!(matches!(err, CommandError::Index { index: 5, count: 2 }));
        assert_eq!(d.registry().active(), 1);
    }

    #[test]
    fn test_call_without_arguments() {
        let mut d = dispatcher();
        let reply = d.call(&[], 1);
        assert!(!reply.is_success());
        assert_eq!(reply.error.as_deref(), Some("not enough input arguments"));
        assert_eq!(d.last_error(), Some("not enough input arguments"));
    }

    #[test]
    fn test_call_reports_failure_through_message() {
        let mut d = dispatcher();
        let reply = d.call(&[HostArray::text("bogus")], 1);
        assert_eq!(reply.status, 0.0);
        assert_eq!(reply.outputs, vec![HostArray::scalar(0.0)]);
        assert_eq!(d.last_error(), Some("invalid command provided: bogus"));

        let reply = d.call(&[HostArray::scalar(3.0)], 1);
        assert!(!reply.is_success());

        let reply = d.call(&[HostArray::text("create")], 1);
        assert!(reply.is_success());
        assert_eq!(d.last_error(), None);
    }
}
