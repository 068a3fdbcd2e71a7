//! In-memory DOM implementing the host traits, for tests.
//!
//! Elements live in a shared arena and are built with a small fluent API:
//!
//! ```ignore
//! let doc = MockDocument::new("chat.example.com");
//! let list = doc.body().child("div").class("messages");
//! list.child("div").class("message").text("hello there");
//! ```
//!
//! Selectors support a CSS subset: comma lists, descendant and child
//! combinators, tag, `#id`, `.class`, and `[attr]` with `=`, `*=`, `^=`,
//! `$=` and `~=`. Anything else never matches.
//!
//! Write behaviour is scripted per element through [`WriteBehavior`], and
//! every write-side call is recorded as a [`MockCall`]. [`MockService`],
//! [`StaticSettings`] and [`NoticeLog`] stand in for the orchestrator's
//! collaborators.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use crate::error::{PlatformError, RedraftError};
use crate::host::{HostDocument, HostElement, LayoutHints, WriteSurface};
use crate::recipe::{EventDescriptor, EventKind};
use crate::session::{ConfigSource, NoticeSink, RewriteService};
use crate::types::{Notice, RewriteRequest};

const BLOCK_TAGS: &[&str] = &[
    "div", "p", "li", "ul", "ol", "article", "section", "header", "footer", "main", "form",
    "blockquote",
];

/// Which write paths an element honours.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteBehavior {
    /// `beforeinput` insertFromPaste replaces the selection.
    pub before_input_paste: bool,
    /// A synthetic `paste` replaces the selection.
    pub paste_event: bool,
    /// `execCommand` delete/insertText work.
    pub exec_commands: bool,
    /// Direct value/content assignment (and clearing) sticks.
    pub assign: bool,
    /// Subtree rebuilds stick.
    pub rebuild: bool,
    /// Select-all only covers the first half of the content.
    pub partial_select: bool,
    /// Every dispatch fails as if event construction threw.
    pub fail_dispatch: bool,
}

impl Default for WriteBehavior {
    fn default() -> Self {
        Self {
            before_input_paste: true,
            paste_event: true,
            exec_commands: true,
            assign: true,
            rebuild: true,
            partial_select: false,
            fail_dispatch: false,
        }
    }
}

impl WriteBehavior {
    /// Ignores every write path.
    pub fn inert() -> Self {
        Self {
            before_input_paste: false,
            paste_event: false,
            exec_commands: false,
            assign: false,
            rebuild: false,
            partial_select: false,
            fail_dispatch: false,
        }
    }
}

/// A recorded write-side call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockCall {
    Focus,
    SelectAll,
    Clear,
    ExecDelete,
    ExecInsert(String),
    Assign(String),
    Rebuild(String),
    Event(EventDescriptor),
    CaretAtEnd,
    Sleep(u32),
}

struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    value: Option<String>,
    parent: Option<usize>,
    children: Vec<usize>,
    props: Vec<String>,
    layout: LayoutHints,
    behavior: WriteBehavior,
    /// Char offsets into the node's content.
    selection: Option<(usize, usize)>,
    calls: Vec<MockCall>,
}

impl Node {
    fn new(tag: &str, parent: Option<usize>) -> Self {
        let tag = tag.to_ascii_lowercase();
        let value = matches!(tag.as_str(), "input" | "textarea").then(String::new);
        Self {
            tag,
            attrs: Vec::new(),
            text: String::new(),
            value,
            parent,
            children: Vec::new(),
            props: Vec::new(),
            layout: LayoutHints::default(),
            behavior: WriteBehavior::default(),
            selection: None,
            calls: Vec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct Arena {
    nodes: Vec<Node>,
    active: Option<usize>,
    hostname: String,
}

const ROOT: usize = 0;

impl Arena {
    fn is_connected(&self, mut id: usize) -> bool {
        loop {
            if id == ROOT {
                return true;
            }
            match self.nodes[id].parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn ancestors(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.nodes[id].parent, |&p| self.nodes[p].parent)
    }

    fn preorder(&self, root: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        out
    }

    fn render(&self, id: usize) -> String {
        let node = &self.nodes[id];
        if let Some(value) = &node.value {
            return value.clone();
        }
        let mut out = node.text.clone();
        for (idx, &child) in node.children.iter().enumerate() {
            if BLOCK_TAGS.contains(&self.nodes[child].tag.as_str()) && (idx > 0 || !out.is_empty())
            {
                out.push('\n');
            }
            out.push_str(&self.render(child));
        }
        out
    }

    fn text_content(&self, id: usize) -> String {
        let node = &self.nodes[id];
        let mut out = node.text.clone();
        for &child in &node.children {
            out.push_str(&self.text_content(child));
        }
        out
    }

    fn clear_children(&mut self, id: usize) {
        let children = std::mem::take(&mut self.nodes[id].children);
        for child in children {
            self.nodes[child].parent = None;
        }
    }

    fn set_content(&mut self, id: usize, text: &str) {
        if self.nodes[id].value.is_some() {
            self.nodes[id].value = Some(text.to_string());
        } else {
            self.clear_children(id);
            self.nodes[id].text = text.to_string();
        }
    }

    fn rebuild(&mut self, id: usize, text: &str) {
        if self.nodes[id].value.is_some() {
            self.set_content(id, text);
            return;
        }
        self.clear_children(id);
        self.nodes[id].text.clear();
        for line in text.split('\n') {
            let child = self.push(id, "p");
            self.nodes[child].text = line.to_string();
        }
    }

    fn push(&mut self, parent: usize, tag: &str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::new(tag, Some(parent)));
        self.nodes[parent].children.push(id);
        id
    }

    fn replace_selection(&mut self, id: usize, insert: &str) {
        let content: Vec<char> = self.render(id).chars().collect();
        let len = content.len();
        let (start, end) = self.nodes[id].selection.unwrap_or((len, len));
        let (start, end) = (start.min(len), end.min(len).max(start.min(len)));
        let mut next: String = content[..start].iter().collect();
        next.push_str(insert);
        next.extend(&content[end..]);
        self.set_content(id, &next);
        let caret = start + insert.chars().count();
        self.nodes[id].selection = Some((caret, caret));
    }
}

/// A mock document. Its root is a `<body>`.
#[derive(Clone)]
pub struct MockDocument {
    arena: Rc<RefCell<Arena>>,
}

impl MockDocument {
    pub fn new(hostname: &str) -> Self {
        let arena = Arena {
            nodes: vec![Node::new("body", None)],
            active: None,
            hostname: hostname.to_string(),
        };
        Self {
            arena: Rc::new(RefCell::new(arena)),
        }
    }

    pub fn body(&self) -> MockElement {
        MockElement {
            arena: self.arena.clone(),
            id: ROOT,
        }
    }

    /// Make `element` the document's active element.
    pub fn focus(&self, element: &MockElement) {
        self.arena.borrow_mut().active = Some(element.id);
    }

    pub fn blur(&self) {
        self.arena.borrow_mut().active = None;
    }
}

impl HostDocument for MockDocument {
    type Element = MockElement;

    fn active_element(&self) -> Option<MockElement> {
        let arena = self.arena.borrow();
        arena
            .active
            .filter(|&id| id != ROOT && arena.is_connected(id))
            .map(|id| MockElement {
                arena: self.arena.clone(),
                id,
            })
    }

    fn query_selector_all(&self, selector: &str) -> Vec<MockElement> {
        let Some(list) = selector::parse(selector) else {
            return Vec::new();
        };
        let arena = self.arena.borrow();
        arena
            .preorder(ROOT)
            .into_iter()
            .filter(|&id| selector::matches_any(&arena, id, &list))
            .map(|id| MockElement {
                arena: self.arena.clone(),
                id,
            })
            .collect()
    }

    fn hostname(&self) -> String {
        self.arena.borrow().hostname.clone()
    }
}

/// Handle to a node in a [`MockDocument`].
#[derive(Clone)]
pub struct MockElement {
    arena: Rc<RefCell<Arena>>,
    id: usize,
}

impl fmt::Debug for MockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.arena.borrow().nodes[self.id].tag.clone();
        write!(f, "MockElement(<{tag}>#{})", self.id)
    }
}

impl MockElement {
    fn wrap(&self, id: usize) -> MockElement {
        MockElement {
            arena: self.arena.clone(),
            id,
        }
    }

    fn with_node(self, f: impl FnOnce(&mut Node)) -> Self {
        f(&mut self.arena.borrow_mut().nodes[self.id]);
        self
    }

    fn record(&self, call: MockCall) {
        self.arena.borrow_mut().nodes[self.id].calls.push(call);
    }

    /// Append a new child element and return it.
    pub fn child(&self, tag: &str) -> MockElement {
        let id = self.arena.borrow_mut().push(self.id, tag);
        self.wrap(id)
    }

    /// Add a class token.
    pub fn class(self, class: &str) -> Self {
        self.with_node(|node| {
            match node.attrs.iter_mut().find(|(k, _)| k == "class") {
                Some((_, v)) if !v.is_empty() => {
                    v.push(' ');
                    v.push_str(class);
                }
                Some((_, v)) => v.push_str(class),
                None => node.attrs.push(("class".into(), class.into())),
            }
        })
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.with_node(|node| {
            node.attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            node.attrs.push((name.to_string(), value.to_string()));
        })
    }

    /// Own text, rendered before any children.
    pub fn text(self, text: &str) -> Self {
        self.with_node(|node| node.text = text.to_string())
    }

    /// Current value. Only form controls have one.
    pub fn with_value(self, value: &str) -> Self {
        self.with_node(|node| node.value = Some(value.to_string()))
    }

    /// Expando property visible to `has_property`.
    pub fn prop(self, name: &str) -> Self {
        self.with_node(|node| node.props.push(name.to_string()))
    }

    pub fn layout(self, layout: LayoutHints) -> Self {
        self.with_node(|node| node.layout = layout)
    }

    pub fn behavior(self, behavior: WriteBehavior) -> Self {
        self.with_node(|node| node.behavior = behavior)
    }

    /// Replace the content as if the user typed it.
    pub fn set_content(&self, text: &str) {
        self.arena.borrow_mut().set_content(self.id, text);
    }

    /// Remove from the tree.
    pub fn detach(&self) {
        let mut arena = self.arena.borrow_mut();
        if let Some(parent) = arena.nodes[self.id].parent.take() {
            arena.nodes[parent].children.retain(|&c| c != self.id);
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.arena.borrow().nodes[self.id].calls.clone()
    }

    pub fn events(&self) -> Vec<EventDescriptor> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Event(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.arena.borrow_mut().nodes[self.id].calls.clear();
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.arena.borrow().nodes[self.id].selection
    }

    fn behavior_flags(&self) -> WriteBehavior {
        self.arena.borrow().nodes[self.id].behavior.clone()
    }
}

impl HostElement for MockElement {
    fn tag_name(&self) -> String {
        self.arena.borrow().nodes[self.id].tag.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.arena.borrow().nodes[self.id]
            .attr(name)
            .map(str::to_string)
    }

    fn is_content_editable(&self) -> bool {
        let arena = self.arena.borrow();
        std::iter::once(self.id)
            .chain(arena.ancestors(self.id))
            .find_map(|id| arena.nodes[id].attr("contenteditable"))
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "" | "true" | "plaintext-only"))
    }

    fn matches(&self, selector: &str) -> bool {
        selector::parse(selector)
            .is_some_and(|list| selector::matches_any(&self.arena.borrow(), self.id, &list))
    }

    fn closest(&self, selector: &str) -> Option<MockElement> {
        let list = selector::parse(selector)?;
        let arena = self.arena.borrow();
        std::iter::once(self.id)
            .chain(arena.ancestors(self.id))
            .find(|&id| selector::matches_any(&arena, id, &list))
            .map(|id| self.wrap(id))
    }

    fn query_selector(&self, selector: &str) -> Option<MockElement> {
        self.query_selector_all(selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<MockElement> {
        let Some(list) = selector::parse(selector) else {
            return Vec::new();
        };
        let arena = self.arena.borrow();
        arena
            .preorder(self.id)
            .into_iter()
            .skip(1)
            .filter(|&id| selector::matches_any(&arena, id, &list))
            .map(|id| self.wrap(id))
            .collect()
    }

    fn inner_text(&self) -> Option<String> {
        Some(self.arena.borrow().render(self.id))
    }

    fn text_content(&self) -> String {
        self.arena.borrow().text_content(self.id)
    }

    fn value(&self) -> Option<String> {
        self.arena.borrow().nodes[self.id].value.clone()
    }

    fn is_connected(&self) -> bool {
        self.arena.borrow().is_connected(self.id)
    }

    fn layout_hints(&self) -> LayoutHints {
        self.arena.borrow().nodes[self.id].layout
    }

    fn has_property(&self, name: &str) -> bool {
        self.arena.borrow().nodes[self.id]
            .props
            .iter()
            .any(|p| p == name)
    }

    fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena) && self.id == other.id
    }

    fn contains(&self, other: &Self) -> bool {
        if self.same_node(other) {
            return true;
        }
        Rc::ptr_eq(&self.arena, &other.arena)
            && self.arena.borrow().ancestors(other.id).any(|id| id == self.id)
    }

    fn precedes(&self, other: &Self) -> bool {
        let arena = self.arena.borrow();
        let order = arena.preorder(ROOT);
        let position = |id: usize| order.iter().position(|&n| n == id);
        match (position(self.id), position(other.id)) {
            (Some(a), Some(b)) => a < b,
            _ => self.id < other.id,
        }
    }
}

impl WriteSurface for MockElement {
    fn focus(&self) -> Result<(), PlatformError> {
        self.record(MockCall::Focus);
        self.arena.borrow_mut().active = Some(self.id);
        Ok(())
    }

    fn select_all(&self) -> Result<(), PlatformError> {
        self.record(MockCall::SelectAll);
        let mut arena = self.arena.borrow_mut();
        let len = arena.render(self.id).chars().count();
        let node = &mut arena.nodes[self.id];
        let end = if node.behavior.partial_select { len / 2 } else { len };
        node.selection = Some((0, end));
        Ok(())
    }

    fn selected_text(&self) -> String {
        let arena = self.arena.borrow();
        let node = &arena.nodes[self.id];
        let Some((start, end)) = node.selection else {
            return String::new();
        };
        let form_control = node.value.is_some();
        // Range text has no separators between blocks.
        arena
            .render(self.id)
            .chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .filter(|&c| form_control || c != '\n')
            .collect()
    }

    fn clear(&self) -> Result<(), PlatformError> {
        self.record(MockCall::Clear);
        if self.behavior_flags().assign {
            let mut arena = self.arena.borrow_mut();
            arena.set_content(self.id, "");
            arena.nodes[self.id].selection = Some((0, 0));
        }
        Ok(())
    }

    fn exec_insert_text(&self, text: &str) -> Result<bool, PlatformError> {
        self.record(MockCall::ExecInsert(text.to_string()));
        if !self.behavior_flags().exec_commands {
            return Ok(false);
        }
        self.arena.borrow_mut().replace_selection(self.id, text);
        Ok(true)
    }

    fn exec_delete(&self) -> Result<bool, PlatformError> {
        self.record(MockCall::ExecDelete);
        if !self.behavior_flags().exec_commands {
            return Ok(false);
        }
        self.arena.borrow_mut().replace_selection(self.id, "");
        Ok(true)
    }

    fn assign(&self, text: &str) -> Result<(), PlatformError> {
        self.record(MockCall::Assign(text.to_string()));
        if self.behavior_flags().assign {
            self.arena.borrow_mut().set_content(self.id, text);
        }
        Ok(())
    }

    fn rebuild(&self, text: &str) -> Result<(), PlatformError> {
        self.record(MockCall::Rebuild(text.to_string()));
        if self.behavior_flags().rebuild {
            self.arena.borrow_mut().rebuild(self.id, text);
        }
        Ok(())
    }

    fn dispatch(&self, event: &EventDescriptor) -> Result<(), PlatformError> {
        let behavior = self.behavior_flags();
        if behavior.fail_dispatch {
            return Err(PlatformError::from("event constructor unavailable"));
        }
        self.record(MockCall::Event(event.clone()));
        let handled = match event.kind {
            EventKind::BeforeInput => {
                behavior.before_input_paste
                    && event.transfer
                    && event.input_type.as_deref() == Some("insertFromPaste")
            }
            EventKind::Paste => behavior.paste_event && event.transfer,
            _ => false,
        };
        if let (true, Some(data)) = (handled, event.data.as_deref()) {
            self.arena.borrow_mut().replace_selection(self.id, data);
        }
        Ok(())
    }

    fn place_caret_at_end(&self) -> Result<(), PlatformError> {
        self.record(MockCall::CaretAtEnd);
        let mut arena = self.arena.borrow_mut();
        let len = arena.render(self.id).chars().count();
        arena.nodes[self.id].selection = Some((len, len));
        Ok(())
    }

    fn sleep(&self, ms: u32) -> impl Future<Output = ()> {
        self.record(MockCall::Sleep(ms));
        std::future::ready(())
    }
}

/// Records dispatched requests. Fails on demand.
#[derive(Clone, Default)]
pub struct MockService {
    requests: Rc<RefCell<Vec<RewriteRequest>>>,
    failure: Rc<RefCell<Option<String>>>,
    stale: Rc<Cell<bool>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<RewriteRequest> {
        self.requests.borrow().clone()
    }

    /// Make every later dispatch fail with a transport error.
    pub fn fail_with(&self, message: &str) {
        *self.failure.borrow_mut() = Some(message.to_string());
    }

    /// Report the embedding context as gone.
    pub fn invalidate(&self) {
        self.stale.set(true);
    }
}

impl RewriteService for MockService {
    fn dispatch(&self, request: &RewriteRequest) -> Result<(), RedraftError> {
        if let Some(message) = self.failure.borrow().clone() {
            return Err(RedraftError::Transport(message));
        }
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }

    fn context_valid(&self) -> bool {
        !self.stale.get()
    }
}

/// Fixed settings.
#[derive(Clone, Debug, Default)]
pub struct StaticSettings {
    pub api_key: Option<String>,
    pub system_prompt: Option<String>,
}

impl StaticSettings {
    pub fn with_key(key: &str) -> Self {
        Self {
            api_key: Some(key.to_string()),
            system_prompt: None,
        }
    }
}

impl ConfigSource for StaticSettings {
    fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }

    fn system_prompt_override(&self) -> Option<String> {
        self.system_prompt.clone()
    }
}

/// Collects notices.
#[derive(Clone, Default)]
pub struct NoticeLog {
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices.borrow().iter().map(|n| n.message.clone()).collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }
}

impl NoticeSink for NoticeLog {
    fn notify(&self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }
}

mod selector {
    //! CSS subset matcher.

    use super::Arena;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(super) enum Combinator {
        Descendant,
        Child,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(super) enum AttrOp {
        Equals,
        Contains,
        Prefix,
        Suffix,
        Word,
    }

    #[derive(Clone, Debug)]
    pub(super) struct AttrSel {
        name: String,
        op: Option<(AttrOp, String)>,
    }

    #[derive(Clone, Debug, Default)]
    pub(super) struct Compound {
        tag: Option<String>,
        id: Option<String>,
        classes: Vec<String>,
        attrs: Vec<AttrSel>,
    }

    pub(super) type Complex = Vec<(Combinator, Compound)>;

    /// Parse a selector list. `None` for unsupported syntax.
    pub(super) fn parse(selector: &str) -> Option<Vec<Complex>> {
        split_list(selector)
            .into_iter()
            .map(|part| parse_complex(&part))
            .collect()
    }

    pub(super) fn matches_any(arena: &Arena, id: usize, list: &[Complex]) -> bool {
        list.iter().any(|complex| matches_complex(arena, id, complex))
    }

    fn split_list(selector: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut quote: Option<char> = None;
        let mut depth = 0usize;
        for ch in selector.chars() {
            match (quote, ch) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(ch),
                (None, '[') => depth += 1,
                (None, ']') => depth = depth.saturating_sub(1),
                (None, ',') if depth == 0 => {
                    parts.push(std::mem::take(&mut current));
                    continue;
                }
                _ => {}
            }
            current.push(ch);
        }
        parts.push(current);
        parts
    }

    fn parse_complex(s: &str) -> Option<Complex> {
        let chars: Vec<char> = s.chars().collect();
        let mut pos = 0;
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        while pos < chars.len() {
            match chars[pos] {
                c if c.is_whitespace() => pos += 1,
                '>' => {
                    combinator = Combinator::Child;
                    pos += 1;
                }
                _ => {
                    let (compound, next) = parse_compound(&chars, pos)?;
                    parts.push((combinator, compound));
                    combinator = Combinator::Descendant;
                    pos = next;
                }
            }
        }
        (!parts.is_empty()).then_some(parts)
    }

    fn is_ident(c: char) -> bool {
        c.is_alphanumeric() || c == '-' || c == '_'
    }

    fn read_ident(chars: &[char], mut pos: usize) -> (String, usize) {
        let start = pos;
        while pos < chars.len() && is_ident(chars[pos]) {
            pos += 1;
        }
        (chars[start..pos].iter().collect(), pos)
    }

    fn skip_ws(chars: &[char], mut pos: usize) -> usize {
        while pos < chars.len() && chars[pos].is_whitespace() {
            pos += 1;
        }
        pos
    }

    fn parse_compound(chars: &[char], mut pos: usize) -> Option<(Compound, usize)> {
        let mut compound = Compound::default();
        if chars[pos] == '*' {
            pos += 1;
        } else if is_ident(chars[pos]) {
            let (tag, next) = read_ident(chars, pos);
            compound.tag = Some(tag.to_ascii_lowercase());
            pos = next;
        }
        while pos < chars.len() {
            match chars[pos] {
                '#' => {
                    let (id, next) = read_ident(chars, pos + 1);
                    if id.is_empty() {
                        return None;
                    }
                    compound.id = Some(id);
                    pos = next;
                }
                '.' => {
                    let (class, next) = read_ident(chars, pos + 1);
                    if class.is_empty() {
                        return None;
                    }
                    compound.classes.push(class);
                    pos = next;
                }
                '[' => {
                    let (attr, next) = parse_attr(chars, pos + 1)?;
                    compound.attrs.push(attr);
                    pos = next;
                }
                c if c.is_whitespace() || c == '>' => break,
                _ => return None,
            }
        }
        Some((compound, pos))
    }

    fn parse_attr(chars: &[char], pos: usize) -> Option<(AttrSel, usize)> {
        let pos = skip_ws(chars, pos);
        let (name, pos) = read_ident(chars, pos);
        if name.is_empty() {
            return None;
        }
        let mut pos = skip_ws(chars, pos);
        if *chars.get(pos)? == ']' {
            return Some((AttrSel { name, op: None }, pos + 1));
        }
        let op = match chars.get(pos)? {
            '=' => AttrOp::Equals,
            '*' => AttrOp::Contains,
            '^' => AttrOp::Prefix,
            '$' => AttrOp::Suffix,
            '~' => AttrOp::Word,
            _ => return None,
        };
        if op != AttrOp::Equals {
            pos += 1;
            if *chars.get(pos)? != '=' {
                return None;
            }
        }
        pos = skip_ws(chars, pos + 1);
        let value: String;
        match *chars.get(pos)? {
            q @ ('"' | '\'') => {
                let end = chars[pos + 1..].iter().position(|&c| c == q)? + pos + 1;
                value = chars[pos + 1..end].iter().collect();
                pos = end + 1;
            }
            _ => {
                let start = pos;
                while pos < chars.len() && chars[pos] != ']' && !chars[pos].is_whitespace() {
                    pos += 1;
                }
                value = chars[start..pos].iter().collect();
            }
        }
        pos = skip_ws(chars, pos);
        if *chars.get(pos)? != ']' {
            return None;
        }
        Some((
            AttrSel {
                name,
                op: Some((op, value)),
            },
            pos + 1,
        ))
    }

    fn matches_compound(arena: &Arena, id: usize, compound: &Compound) -> bool {
        let node = &arena.nodes[id];
        if compound.tag.as_ref().is_some_and(|tag| *tag != node.tag) {
            return false;
        }
        if compound
            .id
            .as_deref()
            .is_some_and(|want| node.attr("id") != Some(want))
        {
            return false;
        }
        let classes = node.attr("class").unwrap_or("");
        if !compound
            .classes
            .iter()
            .all(|c| classes.split_whitespace().any(|have| have == c))
        {
            return false;
        }
        compound.attrs.iter().all(|sel| {
            let Some(have) = node.attr(&sel.name) else {
                return false;
            };
            match &sel.op {
                None => true,
                Some((AttrOp::Equals, want)) => have == want,
                Some((AttrOp::Contains, want)) => !want.is_empty() && have.contains(want.as_str()),
                Some((AttrOp::Prefix, want)) => !want.is_empty() && have.starts_with(want.as_str()),
                Some((AttrOp::Suffix, want)) => !want.is_empty() && have.ends_with(want.as_str()),
                Some((AttrOp::Word, want)) => have.split_whitespace().any(|w| w == want),
            }
        })
    }

    fn matches_complex(arena: &Arena, id: usize, parts: &[(Combinator, Compound)]) -> bool {
        let Some(((combinator, last), rest)) = parts.split_last() else {
            return false;
        };
        if !matches_compound(arena, id, last) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        match combinator {
            Combinator::Child => arena.nodes[id]
                .parent
                .is_some_and(|parent| matches_complex(arena, parent, rest)),
            Combinator::Descendant => arena
                .ancestors(id)
                .any(|ancestor| matches_complex(arena, ancestor, rest)),
        }
    }
}
