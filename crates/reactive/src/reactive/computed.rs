use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::tracker;
use super::{NodeId, ReactiveError, Source, Value};

type Evaluate<T> = Box<dyn Fn(NodeId) -> Result<T, ReactiveError> + Send + Sync>;

struct Node<T> {
    id: NodeId,
    evaluate: Evaluate<T>,
}

/// A value derived from an ordered list of inputs.
///
/// Reading snapshots every input and compares the snapshot with the one used for the
/// previous computation. The combining function only runs if some input differs (by
/// `PartialEq`) or if the value was never computed.
///
/// The combining function runs without any lock held, so it may freely read other
/// computed values. Concurrent readers on different threads may both recompute after
/// the same change; the last result stored wins.
pub struct Computed<T> {
    node: Arc<Node<T>>,
}

impl<T> Computed<T>
where
    T: Clone + Send + 'static,
{
    pub fn new<I, F>(inputs: &[Value<I>], combine: F) -> Self
    where
        I: PartialEq + Clone + Send + 'static,
        F: Fn(&[I]) -> Result<T, ReactiveError> + Send + Sync + 'static,
    {
        let sources = inputs
            .iter()
            .map(|input| Arc::new(input.clone()) as Arc<dyn Source<I>>)
            .collect();
        Self::from_sources(sources, combine)
    }

    pub fn from_sources<I, F>(sources: Vec<Arc<dyn Source<I>>>, combine: F) -> Self
    where
        I: PartialEq + Clone + Send + 'static,
        F: Fn(&[I]) -> Result<T, ReactiveError> + Send + Sync + 'static,
    {
        let last: Mutex<Option<(Vec<I>, T)>> = Mutex::new(None);

        let evaluate = move |id: NodeId| -> Result<T, ReactiveError> {
            let snapshot = sources
                .iter()
                .map(|source| source.read())
                .collect::<Result<Vec<I>, _>>()?;

            if let Some((previous, value)) = last.lock().as_ref() {
                if *previous == snapshot {
                    trace!("Inputs unchanged. node: {}", id);
                    return Ok(value.clone());
                }
            }

            debug!("Recomputing. node: {}, inputs: {}", id, snapshot.len());
            let value = combine(&snapshot)?;
            *last.lock() = Some((snapshot, value.clone()));
            Ok(value)
        };

        Self {
            node: Arc::new(Node {
                id: NodeId::next(),
                evaluate: Box::new(evaluate),
            }),
        }
    }

    /// Returns the current value, recomputing it first if an input changed.
    pub fn value(&self) -> Result<T, ReactiveError> {
        let _in_flight = tracker::enter(self.node.id)?;
        (self.node.evaluate)(self.node.id)
    }

    pub fn id(&self) -> NodeId {
        self.node.id
    }
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T> Debug for Computed<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed")
            .field("id", &self.node.id)
            .finish_non_exhaustive()
    }
}

impl<T> Source<T> for Computed<T>
where
    T: Clone + Send + 'static,
{
    fn read(&self) -> Result<T, ReactiveError> {
        self.value()
    }
}
