use nestsweeper_core::*;

/// Two boards holding each other, plus a clone route into the inner one.
fn tangled(seed: u64) -> Level {
    let mut outer = Board::new(6, 6);
    for pos in [(1, 1), (2, 1), (1, 2), (2, 2), (4, 4)] {
        outer.set(pos, None);
    }
    let mut inner = Board::new(4, 4);
    inner.set((2, 2), None);

    LevelBuilder::new()
        .board(outer)
        .board(inner)
        .portals([
            Portal::new(0, 1, (1, 1), (2, 2)),
            Portal::new(0, 1, (4, 4), (1, 1)).cloned(),
            Portal::new(1, 0, (2, 2), (1, 1)),
        ])
        .total_mines(12)
        .seed(seed)
        .build()
        .unwrap()
}

#[test]
fn neighbors_are_symmetric_unique_and_never_self() {
    let level = tangled(1);

    for (id, cell) in level.graph().cells() {
        let mut unique = cell.neighbors.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), cell.neighbors.len(), "duplicate neighbor of {id:?}");
        assert!(!cell.neighbors.contains(&id), "{id:?} neighbors itself");

        for &other in &cell.neighbors {
            let other_cell = level.cell(other).expect("neighbor must exist");
            assert!(
                other_cell.neighbors.contains(&id),
                "{other:?} is missing {id:?}"
            );
        }
    }
}

#[test]
fn numbers_match_neighboring_mines() {
    for seed in 0..8 {
        let level = tangled(seed);

        for (id, cell) in level.graph().cells() {
            let mines = cell
                .neighbors
                .iter()
                .filter(|&&other| level.cell(other).is_some_and(|c| c.mine))
                .count() as u32;
            assert_eq!(cell.number, mines, "seed {seed}, cell {id:?}");
        }
    }
}

#[test]
fn inner_board_touches_outer_board() {
    let level = tangled(0);

    // the 2x2 pocket at (1, 1) holds the 4x4 board, two inner cells per outer cell
    let corner = level.cell(CellId::new(0, 0, 0)).unwrap();
    assert!(corner.neighbors.contains(&CellId::new(0, 0, 1)));
    assert!(!corner.neighbors.contains(&CellId::new(1, 0, 1)));

    let above = level.cell(CellId::new(1, 0, 0)).unwrap();
    for x in 0..3 {
        assert!(above.neighbors.contains(&CellId::new(x, 0, 1)));
    }
}

#[test]
fn first_open_never_loses() {
    for seed in 0..16 {
        let mut level = tangled(seed);
        let mine = level
            .graph()
            .cells()
            .find(|(_, cell)| cell.mine)
            .map(|(id, _)| id)
            .unwrap();

        let outcome = level.open(mine).unwrap();

        assert_ne!(outcome, RevealOutcome::HitMine, "seed {seed}");
        assert_eq!(level.state(), GameState::Gaming);
        assert_eq!(level.graph().cells().filter(|(_, c)| c.mine).count(), 12);
        for (_, cell) in level.graph().cells() {
            let mines = cell
                .neighbors
                .iter()
                .filter(|&&other| level.cell(other).is_some_and(|c| c.mine))
                .count() as u32;
            assert_eq!(cell.number, mines);
        }
    }
}

#[test]
fn flood_fill_terminates_on_cyclic_graph() {
    let mut level = LevelBuilder::new()
        .board({
            let mut board = Board::new(3, 3);
            board.set((1, 1), None);
            board
        })
        .portal(Portal::new(0, 0, (1, 1), (1, 1)))
        .build()
        .unwrap();

    assert_eq!(level.open(CellId::new(0, 0, 0)).unwrap(), RevealOutcome::Revealed);
    assert!(level.graph().cells().all(|(_, cell)| !cell.covered));
    assert!(level.check_game_won());
}

#[test]
fn marking_cycle_has_no_net_effect() {
    let mut level = tangled(3);
    let id = level
        .graph()
        .cells()
        .find(|(_, cell)| cell.covered)
        .map(|(id, _)| id)
        .unwrap();
    let before = level.mines_left();

    for _ in 0..3 {
        assert_eq!(level.cycle_marking(id).unwrap(), MarkOutcome::Changed);
    }

    assert_eq!(level.mines_left(), before);
    assert!(!level.cell(id).unwrap().is_marked());
}

#[test]
fn chord_opens_neighbors_only_when_flags_match() {
    let mut board = Board::new(3, 3);
    board.set((0, 0), Some(Cell::mine()));
    let mut level = LevelBuilder::new().board(board).build().unwrap();
    let center = CellId::new(1, 1, 0);

    level.open(center).unwrap();
    assert_eq!(level.chord(center).unwrap(), RevealOutcome::NoChange);
    assert_eq!(level.graph().cells().filter(|(_, c)| c.covered).count(), 8);

    level.cycle_marking(CellId::new(0, 0, 0)).unwrap();
    assert_eq!(level.chord(center).unwrap(), RevealOutcome::Revealed);
    assert_eq!(level.graph().cells().filter(|(_, c)| c.covered).count(), 1);
}
