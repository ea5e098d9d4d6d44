use crate::mapping::AtomAtomMapping;
use crate::matcher::{AtomMatcher, BondMatcher};
use crate::timeout::IterationManager;
use crate::vf2::{State, Vf2};

#[derive(Debug, Clone, Copy)]
struct Frame {
    n: usize,
    terminal_only: bool,
    current: Option<usize>,
    // whether (n, current) is applied to the state
    applied: bool,
}

/// Lazy enumeration of complete mappings, driven by an explicit stack.
///
/// Yields the same set of mappings as [`Vf2::match_all`]; taking only the
/// first few never explores the rest of the search tree. Memory stays at
/// one frame per mapped pair whatever the number of mappings.
pub struct Vf2Stream<'v, 'g, A: ?Sized, B: ?Sized> {
    vf2: &'v Vf2<'g, A, B>,
    state: State<'g>,
    stack: Vec<Frame>,
    iterations: IterationManager,
    started: bool,
    finished: bool,
    timeout: bool,
}

impl<'v, 'g, A, B> Vf2Stream<'v, 'g, A, B>
where
    A: AtomMatcher + ?Sized,
    B: BondMatcher + ?Sized,
{
    pub(crate) fn new(vf2: &'v Vf2<'g, A, B>) -> Self {
        Self {
            vf2,
            state: State::new(vf2.source(), vf2.target(), vf2.mode()),
            stack: Vec::new(),
            iterations: vf2.iterations(),
            started: false,
            finished: false,
            timeout: false,
        }
    }

    /// Whether the stream stopped because the iteration limit ran out.
    pub fn timed_out(&self) -> bool {
        self.timeout
    }

    fn push_frame(&mut self) {
        if let Some((n, terminal_only)) = self.state.next_source() {
            self.stack.push(Frame {
                n,
                terminal_only,
                current: None,
                applied: false,
            });
        }
    }

    fn next_feasible(&self, frame: &Frame) -> Option<usize> {
        let mut candidate = self.state.next_target(frame.terminal_only, frame.current);
        while let Some(m) = candidate {
            if self
                .state
                .is_feasible(frame.n, m, self.vf2.atoms(), self.vf2.bonds())
            {
                return Some(m);
            }
            candidate = self.state.next_target(frame.terminal_only, Some(m));
        }
        None
    }

    fn finish(&mut self) -> Option<AtomAtomMapping> {
        self.finished = true;
        None
    }
}

impl<'v, 'g, A, B> Iterator for Vf2Stream<'v, 'g, A, B>
where
    A: AtomMatcher + ?Sized,
    B: BondMatcher + ?Sized,
{
    type Item = AtomAtomMapping;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if !self.started {
            self.started = true;
            if self.vf2.is_dead() {
                return self.finish();
            }
            if self.state.is_goal() {
                self.finished = true;
                return Some(self.state.mapping());
            }
            self.push_frame();
        }

        loop {
            let Some(mut frame) = self.stack.last().copied() else {
                return self.finish();
            };
            if frame.applied {
                if let Some(m) = frame.current {
                    self.state.backtrack(frame.n, m);
                }
                frame.applied = false;
            }

            let Some(m) = self.next_feasible(&frame) else {
                self.stack.pop();
                continue;
            };
            if self.iterations.is_max_iteration() {
                self.timeout = true;
                return self.finish();
            }
            self.iterations.increment();

            self.state.add_pair(frame.n, m);
            frame.current = Some(m);
            frame.applied = true;
            if let Some(top) = self.stack.last_mut() {
                *top = frame;
            }

            // each leaf fixes a different target for some source node, so
            // no mapping is yielded twice
            if self.state.is_goal() {
                return Some(self.state.mapping());
            } else {
                self.push_frame();
            }
        }
    }
}
