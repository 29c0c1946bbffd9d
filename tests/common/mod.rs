//! Test doubles: a scripted in-memory page driver and a configurable flow

#![allow(dead_code)]

use pageflow::batch::Flow;
use pageflow::diag::DiagnosticSink;
use pageflow::{Error, Locator, LogContext, PageDriver, PageNode, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How a scripted node behaves once looked up
#[derive(Clone, Debug)]
pub struct NodeSpec {
    /// Node becomes findable this long after the driver is created
    pub appears_after: Duration,
    pub visible: bool,
    pub interactable: bool,
    pub text: String,
    /// Frame path (locator keys) the node lives in; empty = top document
    pub frame: Vec<String>,
}

impl Default for NodeSpec {
    fn default() -> Self {
        NodeSpec {
            appears_after: Duration::ZERO,
            visible: true,
            interactable: true,
            text: String::new(),
            frame: Vec::new(),
        }
    }
}

fn key(locator: &Locator) -> String {
    locator.to_string()
}

/// Node handle recording every interaction into the driver's shared event log
#[derive(Debug)]
pub struct ScriptedNode {
    key: String,
    spec: NodeSpec,
    events: Arc<Mutex<Vec<String>>>,
}

impl PageNode for ScriptedNode {
    fn text(&self) -> Result<String> {
        Ok(self.spec.text.clone())
    }

    fn click(&self) -> Result<()> {
        self.events.lock().unwrap().push(format!("click:{}", self.key));
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<()> {
        self.events.lock().unwrap().push(format!("type:{}:{}", self.key, text));
        Ok(())
    }

    fn is_visible(&self) -> Result<bool> {
        Ok(self.spec.visible)
    }

    fn is_interactable(&self) -> Result<bool> {
        Ok(self.spec.visible && self.spec.interactable)
    }

    fn invoke_js(&self, fn_decl: &str) -> Result<()> {
        self.events.lock().unwrap().push(format!("js:{}:{}", self.key, fn_decl));
        Ok(())
    }

    fn describe(&self) -> String {
        format!("<scripted {}>", self.key)
    }
}

/// In-memory page driver whose document is a script of node and frame specs
pub struct ScriptedDriver {
    started: Instant,
    nodes: HashMap<String, NodeSpec>,
    /// frame locator key -> the frame path at which it can be entered
    frames: HashMap<String, Vec<String>>,
    scope: Vec<String>,
    /// Interactions performed on nodes (click/type/js), in order
    pub events: Arc<Mutex<Vec<String>>>,
    /// Locator keys probed via find_node, in order
    pub lookups: Arc<Mutex<Vec<String>>>,
    /// Incremented by each close() call
    pub close_count: Arc<Mutex<usize>>,
    pub fail_close: bool,
    pub fail_capture: bool,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        ScriptedDriver {
            started: Instant::now(),
            nodes: HashMap::new(),
            frames: HashMap::new(),
            scope: Vec::new(),
            events: Arc::new(Mutex::new(Vec::new())),
            lookups: Arc::new(Mutex::new(Vec::new())),
            close_count: Arc::new(Mutex::new(0)),
            fail_close: false,
            fail_capture: false,
        }
    }

    pub fn with_node(mut self, locator: &Locator, spec: NodeSpec) -> Self {
        self.nodes.insert(key(locator), spec);
        self
    }

    /// Register a frame reachable from the top document
    pub fn with_frame(mut self, locator: &Locator) -> Self {
        self.frames.insert(key(locator), Vec::new());
        self
    }

    /// Register a frame reachable only inside the given parent path
    pub fn with_nested_frame(mut self, locator: &Locator, parent: Vec<&Locator>) -> Self {
        self.frames.insert(key(locator), parent.into_iter().map(key).collect());
        self
    }

    /// Share the close counter, so a flow can hand out fresh drivers and still
    /// count teardowns
    pub fn with_close_count(mut self, counter: Arc<Mutex<usize>>) -> Self {
        self.close_count = counter;
        self
    }

    pub fn lookup_keys(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn event_log(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl PageDriver for ScriptedDriver {
    type Node = ScriptedNode;

    fn navigate(&mut self, url: &str) -> Result<()> {
        self.scope.clear();
        self.events.lock().unwrap().push(format!("navigate:{url}"));
        Ok(())
    }

    fn find_node(&mut self, locator: &Locator) -> Result<Option<ScriptedNode>> {
        let k = key(locator);
        self.lookups.lock().unwrap().push(k.clone());

        let Some(spec) = self.nodes.get(&k) else {
            return Ok(None);
        };
        if self.started.elapsed() < spec.appears_after || spec.frame != self.scope {
            return Ok(None);
        }
        Ok(Some(ScriptedNode { key: k, spec: spec.clone(), events: self.events.clone() }))
    }

    fn enter_frame(&mut self, locator: &Locator) -> Result<bool> {
        let k = key(locator);
        match self.frames.get(&k) {
            Some(parent) if *parent == self.scope => {
                self.scope.push(k);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn reset_scope(&mut self) -> Result<()> {
        self.scope.clear();
        Ok(())
    }

    fn capture_page(&mut self) -> Result<Vec<u8>> {
        if self.fail_capture {
            return Err(Error::Driver("renderer gone".to_string()));
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    fn close(&mut self) -> Result<()> {
        *self.close_count.lock().unwrap() += 1;
        if self.fail_close {
            return Err(Error::Driver("browser already gone".to_string()));
        }
        Ok(())
    }
}

/// What a test flow should do with one item
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ItemBehavior {
    Match,
    NoMatch,
    Fail,
}

/// Configurable flow driving [`ScriptedDriver`] sessions
pub struct TestFlow {
    pub open_ok: bool,
    pub auth_ok: bool,
    pub behaviors: HashMap<String, ItemBehavior>,
    /// Items whose process() was entered, in order
    pub processed: Arc<Mutex<Vec<String>>>,
    /// Shared across every driver this flow opens
    pub close_count: Arc<Mutex<usize>>,
    pub fail_close: bool,
    /// Set the flag while processing the named item (simulates a UI stop click)
    pub cancel_when: Option<(String, pageflow::CancelFlag)>,
}

impl TestFlow {
    pub fn new() -> Self {
        TestFlow {
            open_ok: true,
            auth_ok: true,
            behaviors: HashMap::new(),
            processed: Arc::new(Mutex::new(Vec::new())),
            close_count: Arc::new(Mutex::new(0)),
            fail_close: false,
            cancel_when: None,
        }
    }

    pub fn behavior(mut self, item: &str, behavior: ItemBehavior) -> Self {
        self.behaviors.insert(item.to_string(), behavior);
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.open_ok = false;
        self
    }

    pub fn failing_auth(mut self) -> Self {
        self.auth_ok = false;
        self
    }

    pub fn cancelling_during(mut self, item: &str, flag: pageflow::CancelFlag) -> Self {
        self.cancel_when = Some((item.to_string(), flag));
        self
    }

    pub fn closes(&self) -> usize {
        *self.close_count.lock().unwrap()
    }

    pub fn processed_items(&self) -> Vec<String> {
        self.processed.lock().unwrap().clone()
    }
}

impl Flow for TestFlow {
    type Driver = ScriptedDriver;
    type Item = String;
    type Outcome = String;

    fn name(&self) -> &str {
        "TEST"
    }

    fn open_session(&self) -> Result<ScriptedDriver> {
        if !self.open_ok {
            return Err(Error::LaunchFailed("no browser binary found".to_string()));
        }
        let mut driver = ScriptedDriver::new().with_close_count(self.close_count.clone());
        driver.fail_close = self.fail_close;
        Ok(driver)
    }

    fn authenticate(&self, _driver: &mut ScriptedDriver, _ctx: &LogContext) -> Result<()> {
        if self.auth_ok {
            Ok(())
        } else {
            Err(Error::NavigationFailed("login page unreachable".to_string()))
        }
    }

    fn process(
        &self,
        _driver: &mut ScriptedDriver,
        item: &String,
        _ctx: &LogContext,
    ) -> Result<Option<String>> {
        self.processed.lock().unwrap().push(item.clone());
        if let Some((when, flag)) = &self.cancel_when {
            if when == item {
                flag.cancel();
            }
        }
        match self.behaviors.get(item).copied().unwrap_or(ItemBehavior::Match) {
            ItemBehavior::Match => Ok(Some(item.clone())),
            ItemBehavior::NoMatch => Ok(None),
            ItemBehavior::Fail => Err(Error::Interaction("search button went stale".to_string())),
        }
    }
}

/// Diagnostic sink recording every capture label
#[derive(Clone)]
pub struct RecordingSink {
    pub labels: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink { labels: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn captured(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }
}

impl DiagnosticSink<ScriptedDriver> for RecordingSink {
    fn capture(&self, _driver: &mut ScriptedDriver, label: &str) {
        self.labels.lock().unwrap().push(label.to_string());
    }
}
