use crate::model::User;

/// Number of users on the podium.
pub const PODIUM_SIZE: usize = 3;

/// Podium display order, as ranks: 2nd on the left, 1st in the middle,
/// 3rd on the right.
pub const PODIUM_DISPLAY_ORDER: [usize; PODIUM_SIZE] = [2, 1, 3];

/// A ranked view of a roster snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    /// Top three in display order `[2nd, 1st, 3rd]`; missing places are `None`.
    pub podium: [Option<User>; PODIUM_SIZE],
    /// Users from rank 4 on, points descending.
    pub overflow: Vec<User>,
}

/// A podium slot with its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PodiumSlot<'a> {
    /// 1-based place.
    pub place: usize,
    /// The user, if that many users exist.
    pub user: Option<&'a User>,
}

/// A user with an absolute rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedUser<'a> {
    /// 1-based rank.
    pub rank: usize,
    /// The user.
    pub user: &'a User,
}

/// Rank users by points, highest first.
///
/// Equal points keep their input order.
pub fn rank(users: &[User]) -> Ranking {
    let mut sorted = users.to_vec();
    sorted.sort_by(|a, b| b.points.cmp(&a.points));

    let overflow = sorted.split_off(sorted.len().min(PODIUM_SIZE));
    let mut top = sorted.into_iter();
    let first = top.next();
    let second = top.next();
    let third = top.next();

    Ranking {
        podium: [second, first, third],
        overflow,
    }
}

impl Ranking {
    /// Podium slots in display order.
    pub fn podium_slots(&self) -> impl Iterator<Item = PodiumSlot<'_>> + '_ {
        PODIUM_DISPLAY_ORDER
            .iter()
            .zip(self.podium.iter())
            .map(|(place, user)| PodiumSlot {
                place: *place,
                user: user.as_ref(),
            })
    }

    /// Get the user at a 1-based rank.
    pub fn at_rank(&self, rank: usize) -> Option<&User> {
        match rank {
            0 => None,
            1..=PODIUM_SIZE => {
                let slot = PODIUM_DISPLAY_ORDER.iter().position(|place| *place == rank)?;
                self.podium[slot].as_ref()
            }
            _ => self.overflow.get(rank - PODIUM_SIZE - 1),
        }
    }

    /// Attach absolute ranks to a window of the overflow list.
    ///
    /// `offset` is the index of the window start within the overflow list.
    pub fn overflow_ranks<'a>(
        &self,
        offset: usize,
        window: &'a [User],
    ) -> impl Iterator<Item = RankedUser<'a>> + 'a {
        window.iter().enumerate().map(move |(idx, user)| RankedUser {
            rank: PODIUM_SIZE + offset + idx + 1,
            user,
        })
    }

    /// Iterate over all ranked users, highest first.
    pub fn iter(&self) -> impl Iterator<Item = RankedUser<'_>> + '_ {
        (1..=PODIUM_SIZE)
            .filter_map(|rank| self.at_rank(rank).map(|user| RankedUser { rank, user }))
            .chain(self.overflow_ranks(0, &self.overflow))
    }

    /// Total number of ranked users.
    pub fn len(&self) -> usize {
        self.podium.iter().flatten().count() + self.overflow.len()
    }

    /// Returns whether nobody is ranked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
