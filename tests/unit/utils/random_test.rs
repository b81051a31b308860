use super::*;

#[test]
fn can_repeat_sequence_with_same_seed() {
    let first = DefaultRandom::new_repeatable(42);
    let second = DefaultRandom::new_repeatable(42);

    let first_values: Vec<i32> = (0..16).map(|_| first.uniform_int(0, 100)).collect();
    let second_values: Vec<i32> = (0..16).map(|_| second.uniform_int(0, 100)).collect();

    assert_eq!(first_values, second_values);
}

#[test]
fn can_produce_values_in_int_range() {
    let random = DefaultRandom::new_repeatable(0);

    for _ in 0..100 {
        let value = random.uniform_int(-5, 5);
        assert!((-5..=5).contains(&value));
    }

    assert_eq!(random.uniform_int(7, 7), 7);
}

#[test]
fn can_produce_values_in_real_range() {
    let random = DefaultRandom::new_repeatable(0);

    for _ in 0..100 {
        let value = random.uniform_real(0.5, 2.5);
        assert!((0.5..2.5).contains(&value));
    }

    assert_eq!(random.uniform_real(1.5, 1.5), 1.5);
}

#[test]
fn can_handle_probability_extremes() {
    let random = DefaultRandom::new_repeatable(0);

    assert!(!random.is_hit(0.));
    assert!(random.is_hit(1.));
}

#[test]
fn can_pick_weighted_index() {
    let random = DefaultRandom::new_repeatable(123);
    let weights = [1., 10., 1.];

    let mut counts = [0_usize; 3];
    for _ in 0..1000 {
        counts[random.weighted(&weights)] += 1;
    }

    // the heaviest weight dominates, yet light weights stay reachable
    assert!(counts[1] > counts[0]);
    assert!(counts[1] > counts[2]);
    assert!(counts.iter().all(|&count| count > 0));
}
