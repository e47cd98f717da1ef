//! Recursive-descent evaluator turning an address string back into a range.
//!
//! Each production takes the tokens it needs from the [`Lexer`] and maps an
//! incoming [`Context`] to a new one. Lookups that find nothing (unknown id,
//! child index past the end, text offset past the end) yield an empty context;
//! only the final collapse turns that into [`Error::Resolution`].
use smallvec::smallvec;
use tracing::{debug, trace};

use crate::chars::{CharStream, CollapsedCounter};
use crate::context::{Context, Location};
use crate::document::Document;
use crate::error::{EndOfStream, Error, Result};
use crate::lexer::{Fence, Lexer, Operator, Token};
use crate::model::{DomNode, NodeKind};
use crate::options::XPointerOptions;
use crate::range::{Boundary, Range};
use crate::traverse::{ChildSearch, effective_parent, nth_matching_child, spliced_children};

/// Functions that open an address without a scheme wrapper.
const EXPRESSION_FUNCTIONS: [&str; 4] = ["id", "string-range", "start-point", "end-point"];

/// Outcome of a predicate expression once coerced.
enum Predicate {
    Positions(Vec<f64>),
    Keep,
    Drop,
}

fn integral(n: f64) -> Option<i64> {
    #[allow(clippy::cast_possible_truncation)]
    (n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0).then_some(n as i64)
}

fn position(n: f64) -> Option<usize> {
    integral(n).and_then(|i| usize::try_from(i).ok()).filter(|&i| i >= 1)
}

pub struct Resolver<'a, N: DomNode> {
    address: &'a str,
    doc: &'a Document<N>,
    options: &'a XPointerOptions,
    lexer: Lexer<'a>,
}

impl<'a, N: DomNode> Resolver<'a, N> {
    pub fn new(address: &'a str, doc: &'a Document<N>, options: &'a XPointerOptions) -> Self {
        Self { address, doc, options, lexer: Lexer::new(address) }
    }

    /// Resolve to a single range: the first entry of the evaluated context.
    pub fn resolve(self) -> Result<Range<N>> {
        let address = self.address;
        let ctx = self.evaluate()?;
        let Some(first) = ctx.into_iter().next() else {
            debug!(address, "address matched nothing");
            return Err(Error::resolution(format!("`{address}` does not match anything in the document")));
        };
        if !first.is_location() {
            return Err(Error::resolution(format!("`{address}` evaluates to a {:?}, not a location", first.kind())));
        }
        first.to_range()
    }

    /// Resolve to the element at the start of the addressed range.
    pub fn resolve_element(self) -> Result<N> {
        let range = self.resolve()?;
        let start = range.start();
        let container = &start.container;
        let node = match container.kind() {
            NodeKind::Element | NodeKind::Document => match container.child_at(start.offset) {
                Some(child) if child.is_element() && !range.is_collapsed() => child,
                _ => container.clone(),
            },
            _ => effective_parent(container).ok_or_else(|| Error::internal("text node without parent"))?,
        };
        if node.is_element() {
            Ok(node)
        } else {
            document_element_of(&node)
        }
    }

    /// Evaluate the whole address into a context.
    pub fn evaluate(mut self) -> Result<Context<N>> {
        if self.address.trim().is_empty() {
            return Err(Error::syntax("empty string is not an address", self.address));
        }
        let first = self.expect_token("an address")?;
        let ctx = match first {
            Token::NameTest(name) => self.bare_names(&name)?,
            Token::Operator(Operator::Slash) if matches!(self.lexer.peek_token()?, Some(Token::Number(_))) => {
                self.child_sequence(self.root_context())?
            }
            // unwrapped expression, as created with `wrap_scheme` off
            token @ Token::Operator(Operator::Slash) => self.expr(token, self.root_context())?,
            token @ Token::FunctionName(_) if starts_expression(&token) => self.expr(token, self.root_context())?,
            token @ Token::FunctionName(_) => self.scheme_parts(token)?,
            other => return Err(self.syntax(format!("unexpected `{other}` at the start of an address"))),
        };
        if let Some(t) = self.lexer.next_token()? {
            return Err(self.syntax(format!("unexpected `{t}` after a complete address")));
        }
        trace!(address = self.address, entries = ctx.len(), "address evaluated");
        Ok(ctx)
    }

    fn root_context(&self) -> Context<N> {
        smallvec![Location::Node(self.doc.root().clone())]
    }

    fn syntax(&self, message: impl Into<String>) -> Error {
        Error::syntax(message, self.lexer.remaining())
    }

    fn expect_token(&mut self, what: &str) -> Result<Token> {
        match self.lexer.next_token()? {
            Some(t) => Ok(t),
            None => Err(self.syntax(format!("address ended prematurely, expected {what}"))),
        }
    }

    fn expect_fence(&mut self, fence: Fence) -> Result<()> {
        let expected = Token::Fence(fence);
        match self.lexer.next_token()? {
            Some(t) if t == expected => Ok(()),
            Some(t) => Err(self.syntax(format!("expected `{expected}`, found `{t}`"))),
            None => Err(self.syntax(format!("address ended prematurely, expected `{expected}`"))),
        }
    }

    fn expect_comma(&mut self) -> Result<()> {
        match self.lexer.next_token()? {
            Some(Token::Comma) => Ok(()),
            Some(t) => Err(self.syntax(format!("expected `,`, found `{t}`"))),
            None => Err(self.syntax("address ended prematurely, expected `,`")),
        }
    }

    fn peek_is_operator(&mut self, op: Operator) -> Result<bool> {
        Ok(self.lexer.peek_token()?.is_some_and(|t| t.is_operator(op)))
    }

    fn peek_is_fence(&mut self, fence: Fence) -> Result<bool> {
        Ok(self.lexer.peek_token()?.is_some_and(|t| t.is_fence(fence)))
    }

    /// `scheme(data)scheme(data)...`: the first part locating something wins.
    fn scheme_parts(&mut self, first: Token) -> Result<Context<N>> {
        let mut token = first;
        let mut found: Option<Context<N>> = None;
        loop {
            let Token::FunctionName(scheme) = &token else {
                return Err(self.syntax(format!("expected a scheme name, found `{token}`")));
            };
            let scheme = scheme.clone();
            if found.is_some() {
                debug!(scheme = scheme.as_str(), "skipping scheme part after a successful one");
                self.lexer.skip_scheme_data()?;
            } else {
                let ctx = match scheme.as_str() {
                    "xpointer" => Some(self.xpointer_part()?),
                    "element" if self.options.element_scheme() => Some(self.element_part()?),
                    other => {
                        debug!(scheme = other, "skipping unsupported scheme");
                        self.lexer.skip_scheme_data()?;
                        None
                    }
                };
                match ctx {
                    Some(ctx) if ctx.first().is_some_and(Location::is_location) => found = Some(ctx),
                    Some(_) => debug!(scheme = scheme.as_str(), "scheme part located nothing"),
                    None => {}
                }
            }
            match self.lexer.next_token()? {
                Some(t) => token = t,
                None => break,
            }
        }
        Ok(found.unwrap_or_default())
    }

    fn xpointer_part(&mut self) -> Result<Context<N>> {
        self.expect_fence(Fence::LeftParen)?;
        let token = self.expect_token("an expression")?;
        let ctx = self.expr(token, self.root_context())?;
        self.expect_fence(Fence::RightParen)?;
        Ok(ctx)
    }

    /// `element(name)`, `element(name/1/2)`, `element(/1/2)`.
    fn element_part(&mut self) -> Result<Context<N>> {
        self.expect_fence(Fence::LeftParen)?;
        let ctx = match self.expect_token("an element pointer")? {
            Token::NameTest(name) => self.bare_names(&name)?,
            Token::Operator(Operator::Slash) => self.child_sequence(self.root_context())?,
            other => return Err(self.syntax(format!("unexpected `{other}` in element()"))),
        };
        self.expect_fence(Fence::RightParen)?;
        Ok(ctx)
    }

    /// Shorthand pointer: an id, optionally followed by a child sequence.
    fn bare_names(&mut self, name: &str) -> Result<Context<N>> {
        let mut ctx = Context::new();
        match self.doc.element_by_id(name) {
            Some(e) => ctx.push(Location::Node(e)),
            None => debug!(id = name, "no element with this id"),
        }
        if self.peek_is_operator(Operator::Slash)? {
            self.lexer.next_token()?;
            ctx = self.child_sequence(ctx)?;
        }
        Ok(ctx)
    }

    /// `1/2/3` after a consumed `/`: repeatedly the n-th unmarked element child.
    fn child_sequence(&mut self, mut ctx: Context<N>) -> Result<Context<N>> {
        loop {
            let index = match self.expect_token("a child index")? {
                Token::Number(n) => {
                    position(n).ok_or_else(|| self.syntax(format!("child index must be a positive integer, found {n}")))?
                }
                other => return Err(self.syntax(format!("expected a child index, found `{other}`"))),
            };
            let next = match ctx.first() {
                Some(Location::Node(node)) => match nth_matching_child(node, index, N::is_element) {
                    ChildSearch::Found(child) => smallvec![Location::Node(child)],
                    ChildSearch::Count(seen) => {
                        debug!(index, seen, "child sequence index beyond element count");
                        Context::new()
                    }
                },
                Some(other) => return Err(Error::unsupported(format!("child sequence from a {:?}", other.kind()))),
                None => Context::new(),
            };
            ctx = next;
            if !self.peek_is_operator(Operator::Slash)? {
                return Ok(ctx);
            }
            self.lexer.next_token()?;
        }
    }

    fn expr(&mut self, token: Token, ctx: Context<N>) -> Result<Context<N>> {
        trace!(token = %token, entries = ctx.len(), "expression");
        let result = match token {
            Token::Operator(Operator::Minus) => return Err(Error::unsupported("unary minus")),
            Token::Operator(Operator::SlashSlash) => return Err(Error::unsupported("`//` location paths")),
            Token::Operator(Operator::Slash) => return self.absolute_path(),
            Token::Fence(Fence::LeftParen) => {
                let inner = self.expect_token("an expression")?;
                let value = self.expr(inner, ctx)?;
                self.expect_fence(Fence::RightParen)?;
                value
            }
            Token::Literal(s) => smallvec![Location::Literal(s.to_string())],
            Token::Number(n) => smallvec![Location::Number(n)],
            Token::FunctionName(name) if name != "range-to" => self.function_call(&name, ctx)?,
            other => return self.relative_path(other, ctx),
        };
        if self.peek_is_operator(Operator::SlashSlash)? {
            return Err(Error::unsupported("`//` location paths"));
        }
        if self.peek_is_operator(Operator::Slash)? {
            self.lexer.next_token()?;
            let step = self.expect_token("a location step")?;
            return self.relative_path(step, result);
        }
        Ok(result)
    }

    fn absolute_path(&mut self) -> Result<Context<N>> {
        let starts_step = matches!(
            self.lexer.peek_token()?,
            Some(
                Token::NameTest(_)
                    | Token::AxisName(_)
                    | Token::At
                    | Token::Dot
                    | Token::DotDot
                    | Token::NodeType(_)
                    | Token::FunctionName(_)
            )
        );
        if !starts_step {
            return Ok(self.root_context());
        }
        let step = self.expect_token("a location step")?;
        self.relative_path(step, self.root_context())
    }

    fn relative_path(&mut self, token: Token, ctx: Context<N>) -> Result<Context<N>> {
        let mut ctx = self.step(token, ctx)?;
        loop {
            if self.peek_is_operator(Operator::SlashSlash)? {
                return Err(Error::unsupported("`//` location paths"));
            }
            if !self.peek_is_operator(Operator::Slash)? {
                return Ok(ctx);
            }
            self.lexer.next_token()?;
            let step = self.expect_token("a location step")?;
            ctx = self.step(step, ctx)?;
        }
    }

    fn step(&mut self, token: Token, ctx: Context<N>) -> Result<Context<N>> {
        trace!(token = %token, entries = ctx.len(), "location step");
        match token {
            Token::Dot => Ok(ctx),
            Token::DotDot => {
                let mut parents = Context::new();
                for node in Self::nodes_of(&ctx)? {
                    if let Some(p) = effective_parent(&node) {
                        let entry = Location::Node(p);
                        if !parents.contains(&entry) {
                            parents.push(entry);
                        }
                    }
                }
                Ok(parents)
            }
            Token::FunctionName(name) if name == "range-to" => self.range_to(ctx),
            Token::FunctionName(name) => Err(Error::unsupported(format!("function `{name}()` as a location step"))),
            Token::AxisName(axis) => {
                if axis != "child" {
                    return Err(Error::unsupported(format!("axis `{axis}`")));
                }
                match self.lexer.next_token()? {
                    Some(Token::ColonColon) => {}
                    _ => return Err(self.syntax("expected `::` after axis name")),
                }
                match self.expect_token("a node test")? {
                    Token::NameTest(name) => self.name_step(&name, &ctx),
                    Token::NodeType(t) => Err(Error::unsupported(format!("node type test `{t}()`"))),
                    other => Err(self.syntax(format!("expected a node test, found `{other}`"))),
                }
            }
            Token::NameTest(name) => self.name_step(&name, &ctx),
            Token::At => Err(Error::unsupported("attribute axis")),
            Token::NodeType(t) => Err(Error::unsupported(format!("node type test `{t}()`"))),
            other => Err(self.syntax(format!("unexpected `{other}` in location path"))),
        }
    }

    fn nodes_of(ctx: &Context<N>) -> Result<Vec<N>> {
        ctx.iter()
            .map(|loc| match loc {
                Location::Node(n) => Ok(n.clone()),
                other => Err(Error::unsupported(format!("location step from a {:?}", other.kind()))),
            })
            .collect()
    }

    /// Child elements named `name` (or any, for `*`) plus their predicates.
    fn name_step(&mut self, name: &str, ctx: &Context<N>) -> Result<Context<N>> {
        let doc = self.doc;
        let test = doc.normalize_tag(name);
        let matches = |n: &N| n.is_element() && (test == "*" || doc.tag_of(n).as_deref() == Some(test.as_str()));
        let parents = Self::nodes_of(ctx)?;
        let all_matches = || -> Context<N> {
            parents.iter().flat_map(|p| spliced_children(p).filter(|c| matches(c))).map(Location::Node).collect()
        };

        let mut candidates: Option<Context<N>> = None;
        while self.peek_is_fence(Fence::LeftBracket)? {
            self.lexer.next_token()?;
            let token = self.expect_token("a predicate")?;
            let value = self.expr(token, ctx.clone())?;
            self.expect_fence(Fence::RightBracket)?;
            match Self::coerce(value) {
                Predicate::Positions(positions) if candidates.is_none() && positions.len() == 1 => {
                    let mut found = Context::new();
                    if let Some(index) = position(positions[0]) {
                        for p in &parents {
                            match nth_matching_child(p, index, &matches) {
                                ChildSearch::Found(c) => found.push(Location::Node(c)),
                                ChildSearch::Count(seen) => debug!(tag = test.as_str(), index, seen, "too few matching children"),
                            }
                        }
                    }
                    candidates = Some(found);
                }
                Predicate::Positions(positions) => {
                    let current = candidates.take().unwrap_or_else(all_matches);
                    let kept = current
                        .into_iter()
                        .enumerate()
                        .filter(|(i, _)| positions.iter().any(|&p| position(p) == Some(i + 1)))
                        .map(|(_, loc)| loc)
                        .collect();
                    candidates = Some(kept);
                }
                Predicate::Keep => {}
                Predicate::Drop => candidates = Some(Context::new()),
            }
        }
        Ok(candidates.unwrap_or_else(all_matches))
    }

    fn coerce(value: Context<N>) -> Predicate {
        if value.is_empty() {
            return Predicate::Drop;
        }
        if value.iter().all(|l| matches!(l, Location::Number(_))) {
            return Predicate::Positions(
                value.iter().filter_map(|l| if let Location::Number(n) = l { Some(*n) } else { None }).collect(),
            );
        }
        match &value[0] {
            Location::Literal(s) if s.is_empty() => Predicate::Drop,
            Location::Boolean(false) | Location::Range(_) => Predicate::Drop,
            _ => Predicate::Keep,
        }
    }

    fn function_call(&mut self, name: &str, ctx: Context<N>) -> Result<Context<N>> {
        self.expect_fence(Fence::LeftParen)?;
        let result = match name {
            "id" => self.id_function()?,
            "string-range" => self.string_range(ctx)?,
            "start-point" => self.boundary_point(ctx, true)?,
            "end-point" => self.boundary_point(ctx, false)?,
            other => return Err(Error::unsupported(format!("function `{other}()`"))),
        };
        self.expect_fence(Fence::RightParen)?;
        Ok(result)
    }

    fn id_function(&mut self) -> Result<Context<N>> {
        let ids = match self.expect_token("an id literal")? {
            Token::Literal(s) => s,
            other => return Err(self.syntax(format!("id() expects a string literal, found `{other}`"))),
        };
        let mut ctx = Context::new();
        for id in ids.split_whitespace() {
            match self.doc.element_by_id(id) {
                Some(e) if !ctx.contains(&Location::Node(e.clone())) => ctx.push(Location::Node(e)),
                Some(_) => {}
                None => debug!(id, "no element with this id"),
            }
        }
        Ok(ctx)
    }

    fn boundary_point(&mut self, ctx: Context<N>, to_start: bool) -> Result<Context<N>> {
        let token = self.expect_token("a location")?;
        let inner = self.expr(token, ctx)?;
        inner
            .into_iter()
            .map(|loc| -> Result<Location<N>> {
                let mut range = loc.to_range()?;
                range.collapse(to_start);
                Ok(Location::Range(range))
            })
            .collect()
    }

    fn number_argument(&mut self, what: &str) -> Result<i64> {
        match self.expect_token(what)? {
            Token::Number(n) => integral(n).ok_or_else(|| self.syntax(format!("{what} must be an integer, found {n}"))),
            other => Err(self.syntax(format!("expected {what}, found `{other}`"))),
        }
    }

    /// `string-range(location, "", start, length)`.
    fn string_range(&mut self, ctx: Context<N>) -> Result<Context<N>> {
        let token = self.expect_token("a location")?;
        let locations = self.expr(token, ctx)?;
        self.expect_comma()?;
        match self.expect_token("a search string")? {
            Token::Literal(s) if s.is_empty() => {}
            Token::Literal(_) => return Err(Error::unsupported("string-range with a non-empty search string")),
            other => return Err(self.syntax(format!("expected a string literal, found `{other}`"))),
        }
        if self.peek_is_fence(Fence::RightParen)? {
            return Err(Error::unsupported("string-range without start and length"));
        }
        self.expect_comma()?;
        let start = self.number_argument("a start offset")?;
        if self.peek_is_fence(Fence::RightParen)? {
            return Err(Error::unsupported("string-range without length"));
        }
        self.expect_comma()?;
        let length = self.number_argument("a length")?;

        let mut out = Context::new();
        for loc in locations {
            match loc {
                Location::Node(node) => {
                    if let Some(range) = string_range_in(&node, start, length)? {
                        out.push(Location::Range(range));
                    }
                }
                other => return Err(Error::unsupported(format!("string-range over a {:?}", other.kind()))),
            }
        }
        Ok(out)
    }

    /// `range-to(expr)`, evaluating `expr` once per incoming entry.
    fn range_to(&mut self, ctx: Context<N>) -> Result<Context<N>> {
        if ctx.is_empty() {
            self.skip_call()?;
            return Ok(ctx);
        }
        self.expect_fence(Fence::LeftParen)?;
        let snapshot = self.lexer.snapshot();
        let mut out = Context::new();
        for loc in ctx {
            self.lexer.restore(snapshot.clone());
            let (start, _) = loc.to_range()?.into_bounds();
            let token = self.expect_token("a range-to target")?;
            let target = self.expr(token, smallvec![loc])?;
            if target.len() > 1 {
                return Err(Error::unsupported("range-to over a location set"));
            }
            let Some(end_loc) = target.into_iter().next() else {
                debug!("range-to target located nothing, keeping the start point");
                out.push(Location::Range(Range::collapsed(start)));
                continue;
            };
            let (_, end) = end_loc.to_range()?.into_bounds();
            out.push(Location::Range(Range::new(start, end)?));
        }
        self.expect_fence(Fence::RightParen)?;
        Ok(out)
    }

    /// Consume a parenthesised argument list without evaluating it.
    fn skip_call(&mut self) -> Result<()> {
        self.expect_fence(Fence::LeftParen)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.expect_token("`)`")? {
                Token::Fence(Fence::LeftParen) => depth += 1,
                Token::Fence(Fence::RightParen) => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }
}

fn starts_expression(token: &Token) -> bool {
    matches!(token, Token::FunctionName(name) if EXPRESSION_FUNCTIONS.contains(&name.as_str()))
}

fn document_element_of<N: DomNode>(node: &N) -> Result<N> {
    node.children().into_iter().find(N::is_element).ok_or_else(|| Error::resolution("document has no document element"))
}

/// Range over the string-value of `node` from the `start`-th counted character
/// spanning `length` counted characters. `None` when the text is too short.
pub fn string_range_in<N: DomNode>(node: &N, start: i64, length: i64) -> Result<Option<Range<N>>> {
    let start = usize::try_from(start.max(1)).unwrap_or(1);
    let length = usize::try_from(length.max(0)).unwrap_or(0);
    let mut stream = CharStream::new(node);
    let mut counter = CollapsedCounter::default();

    let begin = loop {
        match stream.next_char() {
            Ok(c) => {
                if counter.push(c) && counter.count() == start {
                    break stream_point(&stream, 0)?;
                }
            }
            Err(EndOfStream) => {
                if length == 0 && counter.count() + 1 == start {
                    let end_of_text = match stream.current_text_node() {
                        Some(t) => Boundary::new(t.clone(), t.char_len()),
                        None => Boundary::new(node.clone(), 0),
                    };
                    return Ok(Some(Range::collapsed(end_of_text)));
                }
                debug!(start, counted = counter.count(), "string-range start beyond the text");
                return Ok(None);
            }
        }
    };
    if length == 0 {
        return Ok(Some(Range::collapsed(begin)));
    }
    let last = start + length - 1;
    let mut end = stream_point(&stream, 1)?;
    while counter.count() < last {
        match stream.next_char() {
            Ok(c) => {
                if counter.push(c) && counter.count() == last {
                    end = stream_point(&stream, 1)?;
                }
            }
            Err(EndOfStream) => {
                debug!(start, length, counted = counter.count(), "string-range end beyond the text");
                return Ok(None);
            }
        }
    }
    Ok(Some(Range::new(begin, end)?))
}

/// The point before (`shift` 0) or after (`shift` 1) the last streamed character.
fn stream_point<N: DomNode>(stream: &CharStream<N>, shift: usize) -> Result<Boundary<N>> {
    match (stream.current_text_node(), stream.last_char_index()) {
        (Some(node), Some(index)) => Ok(Boundary::new(node.clone(), index + shift)),
        _ => Err(Error::internal("character stream has no current position")),
    }
}
