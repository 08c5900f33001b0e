mod ambient;
mod profile;
mod writer;

pub use ambient::{AmbientProfile, ClusterConnectionInfo};
pub use profile::{
    assemble, Cluster, ConnectionProfileDocument, Context, NamedCluster, NamedContext, NamedUser,
    Preferences, User,
};
pub use writer::write_profile;
