#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use crate::{solve, PageGeometry, PagingError, Window};

    #[test]
    fn test_window_rejects_zero_count() {
        assert_eq!(Window::new(0, 0), Err(PagingError::ZeroCount));
        assert_eq!(Window::new(42, 0), Err(PagingError::ZeroCount));
    }

    #[test]
    fn test_window_rejects_overflow() {
        assert_eq!(
            Window::new(u64::MAX, 1),
            Err(PagingError::WindowOverflow {
                offset: u64::MAX,
                count: 1
            })
        );
        let w = Window::new(u64::MAX - 1, 1).unwrap();
        assert_eq!(w.last_index(), u64::MAX - 1);
    }

    #[test]
    fn test_window_display_is_half_open() {
        let w = Window::new(50, 45).unwrap();
        assert_eq!(w.to_string(), "[50, 95)");
        assert_eq!(w.end(), 95);
        assert_eq!(w.last_index(), 94);
    }

    #[test]
    fn test_solver_containment_and_minimality_grid() {
        for offset in 0..200u64 {
            for count in 1..60u64 {
                let window = Window::new(offset, count).unwrap();
                let g = solve(window);

                assert!(g.page_size >= count, "page smaller than window at {window}");
                assert!(g.page_start() <= offset, "page starts after window at {window}");
                assert!(
                    window.last_index() < g.page_end(),
                    "page ends inside window at {window}"
                );

                for smaller in count..g.page_size {
                    let candidate = PageGeometry {
                        page_size: smaller,
                        page_number: offset / smaller,
                    };
                    assert!(
                        !candidate.contains(&window),
                        "page size {smaller} also fits {window}, solver chose {}",
                        g.page_size
                    );
                }
            }
        }
    }

    #[test]
    fn test_solver_handles_offsets_far_from_zero() {
        let window = Window::new(1_000_003, 7).unwrap();
        let g = solve(window);
        assert!(g.contains(&window));
        assert!(g.page_size >= 7);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PagingError::ZeroCount.to_string(),
            "window count must be at least 1"
        );
        assert_eq!(
            PagingError::MissingFilter.to_string(),
            "no filter supplied and no filter is active"
        );
        assert_eq!(
            PagingError::WindowOutsidePage {
                offset: 3,
                page_start: 10
            }
            .to_string(),
            "window offset 3 lies before page start 10"
        );
        assert_eq!(
            PagingError::InvalidSortToken("+".into()).to_string(),
            "invalid sort token: '+'"
        );
    }

    #[test]
    fn test_wire_shapes() {
        use crate::{RefreshEvent, RefreshReason, Sort, SortOrder};
        use serde_json::json;

        let sort = Sort::By(vec![SortOrder::desc("name"), SortOrder::asc("id")]);
        assert_eq!(
            serde_json::to_value(&sort).unwrap(),
            json!({
                "kind": "by",
                "orders": [
                    {"field": "name", "dir": "desc"},
                    {"field": "id", "dir": "asc"}
                ]
            })
        );
        assert_eq!(
            serde_json::to_value(Sort::Unsorted).unwrap(),
            json!({"kind": "unsorted"})
        );

        let back: Sort = serde_json::from_value(serde_json::to_value(&sort).unwrap()).unwrap();
        assert_eq!(back, sort);

        let event = RefreshEvent {
            generation: 3,
            reason: RefreshReason::FilterReplaced,
        };
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            json!({"generation": 3, "reason": "filter_replaced"})
        );

        let window = Window::new(50, 45).unwrap();
        assert_eq!(
            serde_json::to_value(window).unwrap(),
            json!({"offset": 50, "count": 45})
        );
    }
}
