use rand::SeedableRng;
use rand::rngs::StdRng;

use battleship_mlp::{
    Board, BoardSource, Error, FixedBoard, FleetGenerator, Harness, HarnessConfig, MaskConfig,
    Matrix, Network, NetworkShape, RevealMask, best_move, randomize_mask, scrub_answer_board,
    scrub_visible_board,
};

fn fixed_board() -> Board {
    Board::from_rows(&[
        vec![9, 9, 9, 9, 9, 9],
        vec![9, 0, 0, 0, 0, 0],
        vec![9, 9, 9, 7, 9, 1],
        vec![4, 9, 9, 9, 9, 1],
        vec![4, 9, 8, 9, 9, 1],
        vec![9, 9, 9, 9, 9, 9],
    ])
    .unwrap()
}

fn two_by_five(seed: u64) -> HarnessConfig {
    HarnessConfig {
        runs: 1,
        epochs: 2,
        loops: 5,
        shape: NetworkShape::square(6),
        mask: MaskConfig {
            hide_threshold: 0.7,
            max_attempts: 1_000,
        },
        seed: Some(seed),
        report_every: 1,
    }
}

#[test]
fn fixed_seed_runs_are_reproducible() {
    let mut a = Harness::new(two_by_five(2024), FixedBoard::new(fixed_board())).unwrap();
    let mut b = Harness::new(two_by_five(2024), FixedBoard::new(fixed_board())).unwrap();

    let ra = a.run().unwrap();
    let rb = b.run().unwrap();
    assert_eq!(ra, rb);

    assert_eq!(ra.state.iterations, 2);
    let last = ra.last.unwrap();
    assert_eq!((last.run, last.epoch), (0, 1));
    // Each epoch starts from a fresh network: 5 loops + the extra step at loop 0.
    assert_eq!(last.age, 6);

    for tally in [ra.state.trained, ra.state.baseline, ra.state.evaluation] {
        assert!(tally.hits <= 2);
        assert!(tally.confidence > 0.0 && tally.confidence < 2.0);
    }
    assert_eq!(last.trained.hits, ra.state.trained.hits);
    assert_eq!(
        last.evaluation.hit_rate,
        100.0 * ra.state.evaluation.hits as f64 / 2.0
    );
}

#[test]
fn different_seeds_draw_different_networks() {
    let board = fixed_board();
    let answer = scrub_answer_board(&board);
    let input = Matrix::filled(6, 6, 0.5);

    let a = Network::new_with_seed(NetworkShape::square(6), input.clone(), answer.clone(), 1);
    let b = Network::new_with_seed(NetworkShape::square(6), input, answer, 2);
    assert_ne!(a.unwrap().weights1(), b.unwrap().weights1());
}

#[test]
fn classic_fleet_end_to_end() {
    let cfg = HarnessConfig {
        runs: 2,
        epochs: 2,
        loops: 3,
        seed: Some(9),
        ..HarnessConfig::default()
    };
    let mut harness = Harness::new(cfg, FleetGenerator::classic(8).unwrap()).unwrap();
    let report = harness.run().unwrap();

    assert_eq!(report.state.iterations, 4);
    let last = report.last.unwrap();
    assert_eq!((last.run, last.epoch, last.iteration), (1, 1, 4));
    assert_eq!(last.age, 4);
}

#[test]
fn generated_samples_satisfy_mask_invariant() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut source = FleetGenerator::classic(8).unwrap();
    let cfg = MaskConfig::default();

    for _ in 0..200 {
        let board = source.next_board(&mut rng).unwrap();
        let answer = scrub_answer_board(&board);
        for (i, &v) in answer.as_slice().iter().enumerate() {
            let code = board.cells()[i];
            assert_eq!(v == 1.0, code <= 4 || code == 8);
            assert!(v == 0.0 || v == 1.0);
        }

        let mask = randomize_mask(&answer, &cfg, &mut rng).unwrap();
        let hidden: Vec<_> = mask.hidden_cells().collect();
        assert!(hidden.iter().any(|&(r, c)| answer.get(r, c) == 1.0));
        assert!(hidden.iter().any(|&(r, c)| answer.get(r, c) == 0.0));

        let input = scrub_visible_board(&board, &mask).unwrap();
        for r in 0..8 {
            for c in 0..8 {
                if !mask.is_hidden(r, c) {
                    assert_eq!(input.get(r, c), 0.5);
                }
            }
        }
    }
}

#[test]
fn all_ship_board_has_no_valid_mask() {
    let board = Board::from_rows(&[vec![0, 1], vec![2, 8]]).unwrap();
    let answer = scrub_answer_board(&board);
    let mut rng = StdRng::seed_from_u64(0);
    let err = randomize_mask(&answer, &MaskConfig::default(), &mut rng).unwrap_err();
    assert!(matches!(err, Error::NoValidMask { .. }));
}

#[test]
fn evaluation_clone_guess_does_not_touch_live_weights() {
    let board = fixed_board();
    let answer = scrub_answer_board(&board);
    let mut rng = StdRng::seed_from_u64(4);
    let mask = randomize_mask(&answer, &MaskConfig::default(), &mut rng).unwrap();
    let input = scrub_visible_board(&board, &mask).unwrap();

    let mut live =
        Network::new_with_rng(NetworkShape::square(6), input.clone(), answer.clone(), &mut rng)
            .unwrap();
    live.train().unwrap();
    let w1 = live.weights1().clone();
    let w2 = live.weights2().clone();

    let mut clone = live.evaluation_clone(input, answer).unwrap();
    clone.feedforward().unwrap();
    let mv = best_move(&clone, &mask).unwrap();
    assert!(mask.is_hidden(mv.row, mv.col));
    clone.backprop().unwrap();

    assert_eq!(live.weights1(), &w1);
    assert_eq!(live.weights2(), &w2);
    assert_ne!(clone.weights1(), &w1);
}

#[test]
fn best_move_prefers_first_of_equal_maxima() {
    let output = Matrix::from_rows(&[vec![0.9, 0.1], vec![0.2, 0.95]]).unwrap();
    let target = Matrix::from_rows(&[vec![0.0, 0.0], vec![1.0, 0.0]]).unwrap();
    let mask = RevealMask::from_rows(&[vec![0, 0], vec![0, 1]]).unwrap();

    let mv = battleship_mlp::moves::best_move_in(&output, &target, &mask).unwrap();
    assert_eq!((mv.row, mv.col, mv.confidence, mv.hit), (0, 0, 0.9, false));

    let tied = Matrix::from_rows(&[vec![0.4, 0.9], vec![0.9, 0.95]]).unwrap();
    let mv = battleship_mlp::moves::best_move_in(&tied, &target, &mask).unwrap();
    assert_eq!((mv.row, mv.col), (0, 1));
    assert!(!mv.hit);
}
