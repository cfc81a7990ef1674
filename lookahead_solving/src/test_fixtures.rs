use efg_lite::game::{Action, GameTree, Node, Player};
use lazy_static::lazy_static;

lazy_static! {
    /// Player 2 moves once, choosing between payoffs 1 (`L`) and 3 (`R`).
    pub static ref TWO_LEAVES: GameTree = GameTree::new(
        vec![
            Node::decision(0, Player::Player2, 0, vec![Action::new("L", 1), Action::new("R", 2)]),
            Node::leaf(1, 1.0),
            Node::leaf(2, 3.0),
        ],
        0,
    )
    .unwrap();

    /// `TWO_LEAVES` with the roles of the players exchanged.
    pub static ref TWO_LEAVES_MIRRORED: GameTree = GameTree::new(
        vec![
            Node::decision(0, Player::Player1, 0, vec![Action::new("L", 1), Action::new("R", 2)]),
            Node::leaf(1, -1.0),
            Node::leaf(2, -3.0),
        ],
        0,
    )
    .unwrap();

    pub static ref MATCHING_PENNIES: GameTree = GameTree::new(
        vec![
            Node::decision(0, Player::Player1, 0, vec![Action::new("H", 1), Action::new("T", 2)]),
            Node::decision(1, Player::Player2, 0, vec![Action::new("H", 3), Action::new("T", 4)]),
            Node::decision(2, Player::Player2, 0, vec![Action::new("H", 5), Action::new("T", 6)]),
            Node::leaf(3, 1.0),
            Node::leaf(4, -1.0),
            Node::leaf(5, -1.0),
            Node::leaf(6, 1.0),
        ],
        0,
    )
    .unwrap();

    /// Player 1 either takes 0.5 (`r`) or lets player 2 choose. After `a1`
    /// player 2 moves again and can punish with `b2`.
    pub static ref DEEP_TRAP: GameTree = GameTree::new(
        vec![
            Node::decision(0, Player::Player1, 0, vec![Action::new("l", 1), Action::new("r", 2)]),
            Node::decision(1, Player::Player2, 0, vec![Action::new("a1", 3), Action::new("a2", 4)]),
            Node::leaf(2, 0.5),
            Node::decision(3, Player::Player2, 1, vec![Action::new("b1", 5), Action::new("b2", 6)]),
            Node::leaf(4, 1.0),
            Node::leaf(5, 4.0),
            Node::leaf(6, -2.0),
        ],
        0,
    )
    .unwrap();

    /// A fair coin player 2 does not observe, then one move of player 2.
    pub static ref HIDDEN_COIN: GameTree = GameTree::new(
        vec![
            Node::chance(0, vec![Action::chance("heads", 1, 0.5), Action::chance("tails", 2, 0.5)]),
            Node::decision(1, Player::Player2, 0, vec![Action::new("a", 3), Action::new("b", 4)]),
            Node::decision(2, Player::Player2, 0, vec![Action::new("a", 5), Action::new("b", 6)]),
            Node::leaf(3, 2.0),
            Node::leaf(4, 0.0),
            Node::leaf(5, 0.0),
            Node::leaf(6, 4.0),
        ],
        0,
    )
    .unwrap();
}
