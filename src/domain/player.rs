/// Player body: kinematic state and the contact state machine.
///
/// Three mutually exclusive contact states:
///   Grounded     = standing on a platform or the floor (`on_ground`)
///   WallContact  = pressed against a side wall while airborne (`on_wall`)
///   Airborne     = neither flag set
///
/// Transitions (resolved by `sim::step`):
///   Grounded    --jump-->        Airborne   (vy = jump_power)
///   WallContact --jump-->        Airborne   (vy = jump_power, facing flips)
///   Airborne    --land-->        Grounded   (snap to platform/floor top)
///   Airborne    --hit wall-->    WallContact
///   Grounded    --hit wall-->    Grounded   (facing reverses, no state change)
///
/// `current_platform` is an index into the platform field, valid only while
/// `on_ground`; it is cleared whenever the body leaves the ground so it can
/// never dangle across a reset.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// The three mutually exclusive contact states, derived from the flags.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Grounded,
    WallContact,
    Airborne,
}

/// One frame of player intent. Edge-triggered: a jump request while
/// airborne is dropped, never buffered.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub jump: bool,
}

#[derive(Clone, Debug)]
pub struct PlayerBody {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Vertical velocity, units per frame. Negative = upward.
    pub vy: f32,
    pub facing: Facing,
    pub on_ground: bool,
    pub on_wall: bool,
    /// Index of the platform the body stands on. None while not grounded,
    /// and None when grounded on the floor.
    pub current_platform: Option<usize>,
}

impl PlayerBody {
    /// A body at rest on the ground, facing right.
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        PlayerBody {
            x,
            y,
            size,
            vy: 0.0,
            facing: Facing::Right,
            on_ground: true,
            on_wall: false,
            current_platform: None,
        }
    }

    /// Collision reference point: the body's bottom edge in world space.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.size
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.size
    }

    #[inline]
    pub fn contact(&self) -> Contact {
        if self.on_ground {
            Contact::Grounded
        } else if self.on_wall {
            Contact::WallContact
        } else {
            Contact::Airborne
        }
    }

    /// Jump off the ground. Caller gates on `Contact::Grounded`.
    pub fn jump(&mut self, jump_power: f32) {
        self.vy = jump_power;
        self.on_ground = false;
        self.on_wall = false;
        self.current_platform = None;
    }

    /// Jump off a wall: same impulse, facing reverses away from the wall.
    /// Caller gates on `Contact::WallContact`.
    pub fn wall_jump(&mut self, jump_power: f32) {
        self.vy = jump_power;
        self.facing = self.facing.flipped();
        self.on_wall = false;
        self.current_platform = None;
    }

    /// Snap the body so its bottom rests exactly on `top`, absorb vertical
    /// velocity, and bind the platform (None = floor).
    pub fn land(&mut self, top: f32, platform: Option<usize>) {
        self.y = top - self.size;
        self.vy = 0.0;
        self.on_ground = true;
        self.on_wall = false;
        self.current_platform = platform;
    }

    /// Leave ground contact (start of each downward collision scan).
    pub fn clear_ground(&mut self) {
        self.on_ground = false;
        self.current_platform = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_body_is_grounded() {
        let p = PlayerBody::new(190.0, 680.0, 20.0);
        assert_eq!(p.contact(), Contact::Grounded);
        assert_eq!(p.bottom(), 700.0);
        assert_eq!(p.vy, 0.0);
        assert!(p.current_platform.is_none());
    }

    #[test]
    fn jump_leaves_ground() {
        let mut p = PlayerBody::new(0.0, 0.0, 20.0);
        p.current_platform = Some(3);
        p.jump(-12.0);
        assert_eq!(p.vy, -12.0);
        assert_eq!(p.contact(), Contact::Airborne);
        assert!(p.current_platform.is_none());
    }

    #[test]
    fn wall_jump_flips_facing() {
        let mut p = PlayerBody::new(0.0, 0.0, 20.0);
        p.on_ground = false;
        p.on_wall = true;
        p.facing = Facing::Left;
        assert_eq!(p.contact(), Contact::WallContact);

        p.wall_jump(-12.0);
        assert_eq!(p.facing, Facing::Right);
        assert_eq!(p.vy, -12.0);
        assert_eq!(p.contact(), Contact::Airborne);
    }

    #[test]
    fn land_binds_platform_and_snaps() {
        let mut p = PlayerBody::new(100.0, 0.0, 20.0);
        p.on_ground = false;
        p.vy = 7.5;
        p.land(600.0, Some(4));
        assert_eq!(p.y, 580.0);
        assert_eq!(p.bottom(), 600.0);
        assert_eq!(p.vy, 0.0);
        assert_eq!(p.contact(), Contact::Grounded);
        assert_eq!(p.current_platform, Some(4));
    }

    #[test]
    fn contact_states_are_exclusive() {
        let mut p = PlayerBody::new(0.0, 0.0, 20.0);
        p.on_ground = false;
        p.on_wall = true;
        assert_eq!(p.contact(), Contact::WallContact);
        p.land(100.0, None);
        assert!(p.on_ground && !p.on_wall);
        p.clear_ground();
        assert_eq!(p.contact(), Contact::Airborne);
    }
}
