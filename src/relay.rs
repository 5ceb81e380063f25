//! The broadcast relay connecting one controller to many displays
//!
//! This module manages the set of currently attached parties and fans
//! control events out to all of them except the sender. The relay is a
//! pure transport: it never inspects event semantics, stores no session
//! state beyond the attachment set, and gives no delivery guarantee beyond
//! preserving its own receive order per receiver. A send to a party whose
//! tunnel is gone is silently dropped, and attaching or detaching a party
//! is not itself a control event.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    str::FromStr,
};

use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use crate::{event::Event, session::Tunnel};

/// A unique identifier for a party attached to the relay
///
/// Each party (the controller or a display) gets a unique id that persists
/// for as long as it stays attached.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random party id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an id from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// The role of a party attached to the relay
///
/// The relay treats both kinds identically when fanning out; the
/// distinction exists for bookkeeping and diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum PartyKind {
    /// The party driving the game through its input device
    Controller,
    /// A passive party rendering the synchronized state
    Display,
}

/// Errors that can occur when attaching parties
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The relay has reached the maximum number of attached parties
    #[error("maximum number of parties reached")]
    MaximumParties,
}

/// The set of parties currently attached to the relay
///
/// This struct tracks attached parties and their kinds and provides the
/// broadcast fan-out. Tunnels are not stored here; like everywhere else in
/// the crate they are resolved per call through a `tunnel_finder` closure,
/// so a dead connection simply stops resolving.
#[derive(Default, Serialize, Deserialize)]
#[serde(from = "PartiesSerde")]
pub struct Parties {
    /// Primary mapping from party id to its kind
    mapping: HashMap<Id, PartyKind>,

    /// Reverse mapping organized by kind for efficient filtering
    #[serde(skip_serializing)]
    reverse_mapping: EnumMap<PartyKind, HashSet<Id>>,
}

/// Serialization helper for the Parties struct
#[derive(Deserialize)]
struct PartiesSerde {
    mapping: HashMap<Id, PartyKind>,
}

impl From<PartiesSerde> for Parties {
    /// Rebuilds the reverse mapping, which is not serialized
    fn from(serde: PartiesSerde) -> Self {
        let PartiesSerde { mapping } = serde;
        let mut reverse_mapping: EnumMap<PartyKind, HashSet<Id>> = EnumMap::default();
        for (id, kind) in &mapping {
            reverse_mapping[*kind].insert(*id);
        }
        Self {
            mapping,
            reverse_mapping,
        }
    }
}

impl Parties {
    /// Attaches a new party to the relay
    ///
    /// Attachment has no effect on any other party's presentation state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MaximumParties`] if the relay is full.
    pub fn attach(&mut self, party_id: Id, kind: PartyKind) -> Result<(), Error> {
        if self.mapping.len() >= crate::constants::relay::MAX_PARTY_COUNT {
            return Err(Error::MaximumParties);
        }

        self.mapping.insert(party_id, kind);
        self.reverse_mapping[kind].insert(party_id);

        Ok(())
    }

    /// Detaches a party from the relay
    ///
    /// Detachment is silent: no event is emitted and the remaining parties
    /// keep their state untouched. Detaching an unknown id is a no-op.
    pub fn detach(&mut self, party_id: Id) {
        if let Some(kind) = self.mapping.remove(&party_id) {
            self.reverse_mapping[kind].remove(&party_id);
        }
    }

    /// Gets the kind of a specific party
    pub fn kind(&self, party_id: Id) -> Option<PartyKind> {
        self.mapping.get(&party_id).copied()
    }

    /// Checks whether a party is attached
    pub fn has_party(&self, party_id: Id) -> bool {
        self.mapping.contains_key(&party_id)
    }

    /// Gets the count of attached parties of a specific kind
    pub fn specific_count(&self, filter: PartyKind) -> usize {
        self.reverse_mapping[filter].len()
    }

    /// Gets a vector of all attached parties with live tunnels
    ///
    /// # Arguments
    ///
    /// * `tunnel_finder` - Function to retrieve the tunnel for a given id
    ///
    /// # Returns
    ///
    /// Vector of tuples containing (id, tunnel, kind) for all parties whose
    /// tunnel still resolves
    pub fn vec<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        tunnel_finder: F,
    ) -> Vec<(Id, T, PartyKind)> {
        self.reverse_mapping
            .values()
            .flat_map(|v| v.iter())
            .filter_map(|x| match (tunnel_finder(*x), self.mapping.get(x)) {
                (Some(t), Some(k)) => Some((*x, t, *k)),
                _ => None,
            })
            .collect_vec()
    }

    /// Re-emits an event to every attached party except the sender
    ///
    /// This is the whole of the relay's semantics: no acknowledgment, no
    /// retry, no persistence. Parties whose tunnel no longer resolves are
    /// skipped silently, and the sender never receives its own event back.
    ///
    /// # Arguments
    ///
    /// * `sender` - The party the event came from
    /// * `event` - The event to fan out
    /// * `tunnel_finder` - Function to retrieve tunnels for parties
    pub fn broadcast<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        sender: Id,
        event: &Event,
        tunnel_finder: F,
    ) {
        for (id, tunnel, _) in self.vec(tunnel_finder) {
            if id == sender {
                continue;
            }

            tunnel.send_event(event);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    /// Test tunnel recording every event it is handed
    #[derive(Clone, Default)]
    struct RecordingTunnel {
        received: Rc<RefCell<Vec<Event>>>,
    }

    impl Tunnel for RecordingTunnel {
        fn send_event(&self, event: &Event) {
            self.received.borrow_mut().push(event.clone());
        }

        fn close(self) {}
    }

    fn attach_three() -> (Parties, Id, Id, Id) {
        let mut parties = Parties::default();
        let controller = Id::new();
        let display_a = Id::new();
        let display_b = Id::new();

        parties
            .attach(controller, PartyKind::Controller)
            .expect("capacity");
        parties
            .attach(display_a, PartyKind::Display)
            .expect("capacity");
        parties
            .attach(display_b, PartyKind::Display)
            .expect("capacity");

        (parties, controller, display_a, display_b)
    }

    #[test]
    fn test_broadcast_reaches_everyone_but_the_sender() {
        let (parties, controller, display_a, display_b) = attach_three();

        let tunnels: HashMap<Id, RecordingTunnel> = [controller, display_a, display_b]
            .into_iter()
            .map(|id| (id, RecordingTunnel::default()))
            .collect();

        parties.broadcast(controller, &Event::ShowAllCases, |id| {
            tunnels.get(&id).cloned()
        });

        assert!(tunnels[&controller].received.borrow().is_empty());
        assert_eq!(
            *tunnels[&display_a].received.borrow(),
            vec![Event::ShowAllCases]
        );
        assert_eq!(
            *tunnels[&display_b].received.borrow(),
            vec![Event::ShowAllCases]
        );
    }

    #[test]
    fn test_broadcast_skips_dead_tunnels_silently() {
        let (parties, controller, display_a, display_b) = attach_three();

        let live = RecordingTunnel::default();
        let live_clone = live.clone();

        // display_b has no tunnel anymore; the send is dropped without error
        parties.broadcast(controller, &Event::CloseQuiz, move |id| {
            (id == display_a).then(|| live_clone.clone())
        });

        assert_eq!(*live.received.borrow(), vec![Event::CloseQuiz]);
        let _ = display_b;
    }

    #[test]
    fn test_broadcast_preserves_send_order_per_receiver() {
        let (parties, controller, display_a, _) = attach_three();

        let tunnel = RecordingTunnel::default();
        let tunnel_clone = tunnel.clone();
        let finder = move |id| (id == display_a).then(|| tunnel_clone.clone());

        parties.broadcast(controller, &Event::ShowAllCases, &finder);
        parties.broadcast(controller, &Event::OpenQuiz(0), &finder);
        parties.broadcast(controller, &Event::CloseQuiz, &finder);

        assert_eq!(
            *tunnel.received.borrow(),
            vec![Event::ShowAllCases, Event::OpenQuiz(0), Event::CloseQuiz]
        );
    }

    #[test]
    fn test_detach_removes_party() {
        let (mut parties, _, display_a, _) = attach_three();

        assert_eq!(parties.specific_count(PartyKind::Display), 2);
        parties.detach(display_a);
        assert_eq!(parties.specific_count(PartyKind::Display), 1);
        assert!(!parties.has_party(display_a));

        // detaching again is harmless
        parties.detach(display_a);
        assert_eq!(parties.specific_count(PartyKind::Display), 1);
    }

    #[test]
    fn test_attach_respects_capacity() {
        let mut parties = Parties::default();

        for _ in 0..crate::constants::relay::MAX_PARTY_COUNT {
            parties
                .attach(Id::new(), PartyKind::Display)
                .expect("under capacity");
        }

        assert_eq!(
            parties.attach(Id::new(), PartyKind::Display),
            Err(Error::MaximumParties)
        );
    }

    #[test]
    fn test_kind_lookup() {
        let (parties, controller, display_a, _) = attach_three();

        assert_eq!(parties.kind(controller), Some(PartyKind::Controller));
        assert_eq!(parties.kind(display_a), Some(PartyKind::Display));
        assert_eq!(parties.kind(Id::new()), None);
    }
}
