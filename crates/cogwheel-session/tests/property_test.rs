//! Property tests for the gate, the pager and the memory board.

use cogwheel_common::UserId;
use cogwheel_session::{
    Directive, Feature, MemoryBoard, MemoryEvent, Pager, PagerEvent, Session, TileState,
    Transition,
};
use proptest::prelude::*;
use std::time::Duration;

const OWNER: UserId = UserId(1);

fn pager_event() -> impl Strategy<Value = PagerEvent<u8>> {
    prop_oneof![
        Just(PagerEvent::First),
        Just(PagerEvent::Prev),
        Just(PagerEvent::Next),
        Just(PagerEvent::Last),
        Just(PagerEvent::Close),
        "[0-9a-z ]{0,4}".prop_map(PagerEvent::GoTo),
        prop::collection::vec(any::<u8>(), 0..5).prop_map(|pages| PagerEvent::Filter {
            label: "x".into(),
            pages,
        }),
    ]
}

proptest! {
    #[test]
    fn non_owner_never_changes_payload(
        actor in 2u64..u64::MAX,
        events in prop::collection::vec(pager_event(), 1..20),
    ) {
        let pager = Pager::new("All", vec![1u8, 2, 3, 4]);
        let mut session = Session::new(Feature::Help, OWNER, pager.clone(), Duration::from_secs(30));

        for event in events {
            prop_assert!(session.submit(UserId(actor), event).is_err());
            prop_assert_eq!(session.current_payload(), &pager);
            prop_assert!(!session.is_terminal());
        }
    }

    #[test]
    fn goto_outside_range_is_rejected(pages in 1usize..40, start in 0usize..40, k in any::<i64>()) {
        prop_assume!(k < 1 || k > i64::try_from(pages).unwrap());

        let mut pager = Pager::new("All", (0..pages).collect::<Vec<_>>());
        for _ in 0..start.min(pages - 1) {
            pager.apply(PagerEvent::Next);
        }
        let before = pager.page_number();

        let step = pager.apply(PagerEvent::GoTo(k.to_string()));
        let is_reject = matches!(step.directive, Directive::Reject(_));
        prop_assert!(is_reject);
        prop_assert_eq!(pager.page_number(), before);
    }

    #[test]
    fn goto_inside_range_lands_on_page(pages in 1usize..40, k in 1usize..40) {
        prop_assume!(k <= pages);
        let mut pager = Pager::new("All", (0..pages).collect::<Vec<_>>());
        pager.apply(PagerEvent::GoTo(k.to_string()));
        prop_assert_eq!(pager.page_number(), k);
    }

    #[test]
    fn matches_only_count_equal_pairs(
        seed in any::<u64>(),
        picks in prop::collection::vec((0usize..5, 0usize..5), 0..80),
    ) {
        use rand::{rngs::StdRng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(seed);
        let symbols: Vec<u16> = (0..30).collect();
        let mut board = MemoryBoard::generate(5, &symbols, Duration::from_millis(10), &mut rng).unwrap();

        for (x, y) in picks {
            let before = board.matches();
            let step = board.apply(MemoryEvent::Reveal { x, y });

            if let Directive::Deferred { event, .. } = step.directive {
                board.apply(event);
            }

            let matched = board.rows().flatten().filter(|t| t.state == TileState::Matched).count();
            prop_assert_eq!(matched, board.matches() * 2);
            prop_assert!(board.matches() - before <= 1);
            prop_assert!(board.rows().flatten().all(|t| t.state != TileState::Incorrect));
        }
    }
}
