use crate::geometry::BodyLabel;

/// Whether two colliding bodies are the ball and the goal, in either order.
pub fn is_winning_collision(a: BodyLabel, b: BodyLabel) -> bool {
    matches!(
        (a, b),
        (BodyLabel::Ball, BodyLabel::Goal) | (BodyLabel::Goal, BodyLabel::Ball)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [BodyLabel; 4] = [
        BodyLabel::Wall,
        BodyLabel::Boundary,
        BodyLabel::Goal,
        BodyLabel::Ball,
    ];

    #[test]
    fn ball_and_goal_win_in_either_order() {
        assert!(is_winning_collision(BodyLabel::Ball, BodyLabel::Goal));
        assert!(is_winning_collision(BodyLabel::Goal, BodyLabel::Ball));
    }

    #[test]
    fn every_other_pair_is_ignored() {
        for a in LABELS {
            for b in LABELS {
                let expected = matches!(
                    (a, b),
                    (BodyLabel::Ball, BodyLabel::Goal) | (BodyLabel::Goal, BodyLabel::Ball)
                );
                assert_eq!(is_winning_collision(a, b), expected, "{a:?} vs {b:?}");
            }
        }
        assert!(!is_winning_collision(BodyLabel::Ball, BodyLabel::Wall));
        assert!(!is_winning_collision(BodyLabel::Wall, BodyLabel::Wall));
        assert!(!is_winning_collision(BodyLabel::Goal, BodyLabel::Goal));
    }
}
