mod feedback;
mod genre;
mod ids;
mod playlist;
mod track;
mod user;

pub use feedback::{Reaction, ReactionWithTrack, Review, ReviewFilter, ReviewWithUser};
pub use genre::Genre;
pub use ids::{PlaylistId, ReviewId, TrackId, UserId};
pub use playlist::{
    CreatePlaylist, Playlist, PlaylistEntry, PlaylistScope, PlaylistWithTracks, UpdatePlaylist,
};
pub use track::{CreateTrack, Track, TrackFilter, TrackWithStats};
pub use user::{CreateUser, UpdateUser, User, UserRole};
