use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Artist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Artist::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Artist::Name).string().not_null())
                    .col(ColumnDef::new(Artist::Genres).text())
                    .col(ColumnDef::new(Artist::Popularity).integer())
                    .col(ColumnDef::new(Artist::ImageUrl).string())
                    .col(ColumnDef::new(Artist::ExternalUrl).string())
                    .col(ColumnDef::new(Artist::Href).string())
                    .col(ColumnDef::new(Artist::Uri).string())
                    .col(ColumnDef::new(Artist::FollowersTotal).big_integer())
                    .col(ColumnDef::new(Artist::ImagesJson).text())
                    .col(ColumnDef::new(Artist::SyncedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Album::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Album::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Album::Name).string().not_null())
                    .col(ColumnDef::new(Album::ReleaseDate).string())
                    .col(ColumnDef::new(Album::AlbumType).string())
                    .col(ColumnDef::new(Album::TotalTracks).integer())
                    .col(ColumnDef::new(Album::ImageUrl).string())
                    .col(ColumnDef::new(Album::ExternalUrl).string())
                    .col(ColumnDef::new(Album::Href).string())
                    .col(ColumnDef::new(Album::Uri).string())
                    .col(ColumnDef::new(Album::ReleaseDatePrecision).string())
                    .col(ColumnDef::new(Album::ImagesJson).text())
                    .col(ColumnDef::new(Album::AvailableMarketsJson).text())
                    .col(ColumnDef::new(Album::RestrictionsReason).string())
                    .col(ColumnDef::new(Album::SyncedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Track::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Track::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Track::Name).string().not_null())
                    .col(ColumnDef::new(Track::AlbumId).string())
                    .col(ColumnDef::new(Track::DurationMs).integer())
                    .col(ColumnDef::new(Track::Explicit).boolean().not_null())
                    .col(ColumnDef::new(Track::Popularity).integer().not_null())
                    .col(ColumnDef::new(Track::PreviewUrl).string())
                    .col(ColumnDef::new(Track::ExternalUrl).string())
                    .col(ColumnDef::new(Track::Href).string())
                    .col(ColumnDef::new(Track::Uri).string())
                    .col(ColumnDef::new(Track::DiscNumber).integer())
                    .col(ColumnDef::new(Track::TrackNumber).integer())
                    .col(ColumnDef::new(Track::IsLocal).boolean().not_null())
                    .col(ColumnDef::new(Track::IsPlayable).boolean())
                    .col(ColumnDef::new(Track::Isrc).string())
                    .col(ColumnDef::new(Track::ExternalIdsJson).text())
                    .col(ColumnDef::new(Track::AvailableMarketsJson).text())
                    .col(ColumnDef::new(Track::RestrictionsReason).string())
                    .col(ColumnDef::new(Track::LinkedFromJson).text())
                    .col(ColumnDef::new(Track::SyncedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracks_album_id")
                            .from(Track::Table, Track::AlbumId)
                            .to(Album::Table, Album::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TrackArtist::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TrackArtist::TrackId).string().not_null())
                    .col(ColumnDef::new(TrackArtist::ArtistId).string().not_null())
                    .col(ColumnDef::new(TrackArtist::Position).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(TrackArtist::TrackId)
                            .col(TrackArtist::ArtistId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_track_artists_track_id")
                            .from(TrackArtist::Table, TrackArtist::TrackId)
                            .to(Track::Table, Track::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_track_artists_artist_id")
                            .from(TrackArtist::Table, TrackArtist::ArtistId)
                            .to(Artist::Table, Artist::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Playlist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Playlist::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Playlist::Name).string().not_null())
                    .col(ColumnDef::new(Playlist::Description).text())
                    .col(ColumnDef::new(Playlist::OwnerId).string())
                    .col(ColumnDef::new(Playlist::OwnerName).string())
                    .col(ColumnDef::new(Playlist::Public).boolean().not_null())
                    .col(ColumnDef::new(Playlist::Collaborative).boolean().not_null())
                    .col(ColumnDef::new(Playlist::SnapshotId).string())
                    .col(ColumnDef::new(Playlist::ImageUrl).string())
                    .col(ColumnDef::new(Playlist::ExternalUrl).string())
                    .col(ColumnDef::new(Playlist::Href).string())
                    .col(ColumnDef::new(Playlist::Uri).string())
                    .col(ColumnDef::new(Playlist::PrimaryColor).string())
                    .col(ColumnDef::new(Playlist::TracksTotal).integer())
                    .col(ColumnDef::new(Playlist::OwnerUri).string())
                    .col(ColumnDef::new(Playlist::OwnerExternalUrl).string())
                    .col(ColumnDef::new(Playlist::OwnerType).string())
                    .col(ColumnDef::new(Playlist::ImagesJson).text())
                    .col(ColumnDef::new(Playlist::SyncedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlaylistTrack::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlaylistTrack::PlaylistId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlaylistTrack::TrackId).string().not_null())
                    .col(
                        ColumnDef::new(PlaylistTrack::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlaylistTrack::AddedAt).string())
                    .col(ColumnDef::new(PlaylistTrack::AddedBy).string())
                    .col(ColumnDef::new(PlaylistTrack::AddedByType).string())
                    .col(ColumnDef::new(PlaylistTrack::AddedByUri).string())
                    .col(ColumnDef::new(PlaylistTrack::AddedByHref).string())
                    .col(ColumnDef::new(PlaylistTrack::AddedByExternalUrl).string())
                    .col(
                        ColumnDef::new(PlaylistTrack::IsLocal)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlaylistTrack::VideoThumbnailUrl).string())
                    .primary_key(
                        Index::create()
                            .col(PlaylistTrack::PlaylistId)
                            .col(PlaylistTrack::TrackId)
                            .col(PlaylistTrack::Position),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_tracks_playlist_id")
                            .from(PlaylistTrack::Table, PlaylistTrack::PlaylistId)
                            .to(Playlist::Table, Playlist::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_tracks_track_id")
                            .from(PlaylistTrack::Table, PlaylistTrack::TrackId)
                            .to(Track::Table, Track::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AudioFeatures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AudioFeatures::TrackId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AudioFeatures::Danceability)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AudioFeatures::Energy).double().not_null())
                    .col(ColumnDef::new(AudioFeatures::Key).integer().not_null())
                    .col(ColumnDef::new(AudioFeatures::Loudness).double().not_null())
                    .col(ColumnDef::new(AudioFeatures::Mode).integer().not_null())
                    .col(
                        ColumnDef::new(AudioFeatures::Speechiness)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AudioFeatures::Acousticness)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AudioFeatures::Instrumentalness)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AudioFeatures::Liveness).double().not_null())
                    .col(ColumnDef::new(AudioFeatures::Valence).double().not_null())
                    .col(ColumnDef::new(AudioFeatures::Tempo).double().not_null())
                    .col(
                        ColumnDef::new(AudioFeatures::TimeSignature)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AudioFeatures::DurationMs).integer())
                    .col(ColumnDef::new(AudioFeatures::AnalysisUrl).string())
                    .col(ColumnDef::new(AudioFeatures::TrackHref).string())
                    .col(ColumnDef::new(AudioFeatures::Uri).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_audio_features_track_id")
                            .from(AudioFeatures::Table, AudioFeatures::TrackId)
                            .to(Track::Table, Track::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracks_album")
                    .table(Track::Table)
                    .col(Track::AlbumId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_track_artists_artist")
                    .table(TrackArtist::Table)
                    .col(TrackArtist::ArtistId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_playlist_tracks_playlist_position")
                    .table(PlaylistTrack::Table)
                    .col(PlaylistTrack::PlaylistId)
                    .col(PlaylistTrack::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_playlist_tracks_track")
                    .table(PlaylistTrack::Table)
                    .col(PlaylistTrack::TrackId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_artists_popularity")
                    .table(Artist::Table)
                    .col(Artist::Popularity)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AudioFeatures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlaylistTrack::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Playlist::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TrackArtist::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Track::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Album::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Artist::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Artist {
    #[sea_orm(iden = "artists")]
    Table,
    Id,
    Name,
    Genres,
    Popularity,
    ImageUrl,
    ExternalUrl,
    Href,
    Uri,
    FollowersTotal,
    ImagesJson,
    SyncedAt,
}

#[derive(DeriveIden)]
enum Album {
    #[sea_orm(iden = "albums")]
    Table,
    Id,
    Name,
    ReleaseDate,
    AlbumType,
    TotalTracks,
    ImageUrl,
    ExternalUrl,
    Href,
    Uri,
    ReleaseDatePrecision,
    ImagesJson,
    AvailableMarketsJson,
    RestrictionsReason,
    SyncedAt,
}

#[derive(DeriveIden)]
enum Track {
    #[sea_orm(iden = "tracks")]
    Table,
    Id,
    Name,
    AlbumId,
    DurationMs,
    Explicit,
    Popularity,
    PreviewUrl,
    ExternalUrl,
    Href,
    Uri,
    DiscNumber,
    TrackNumber,
    IsLocal,
    IsPlayable,
    Isrc,
    ExternalIdsJson,
    AvailableMarketsJson,
    RestrictionsReason,
    LinkedFromJson,
    SyncedAt,
}

#[derive(DeriveIden)]
enum TrackArtist {
    #[sea_orm(iden = "track_artists")]
    Table,
    TrackId,
    ArtistId,
    Position,
}

#[derive(DeriveIden)]
enum Playlist {
    #[sea_orm(iden = "playlists")]
    Table,
    Id,
    Name,
    Description,
    OwnerId,
    OwnerName,
    Public,
    Collaborative,
    SnapshotId,
    ImageUrl,
    ExternalUrl,
    Href,
    Uri,
    PrimaryColor,
    TracksTotal,
    OwnerUri,
    OwnerExternalUrl,
    OwnerType,
    ImagesJson,
    SyncedAt,
}

#[derive(DeriveIden)]
enum PlaylistTrack {
    #[sea_orm(iden = "playlist_tracks")]
    Table,
    PlaylistId,
    TrackId,
    Position,
    AddedAt,
    AddedBy,
    AddedByType,
    AddedByUri,
    AddedByHref,
    AddedByExternalUrl,
    IsLocal,
    VideoThumbnailUrl,
}

#[derive(DeriveIden)]
enum AudioFeatures {
    #[sea_orm(iden = "audio_features")]
    Table,
    TrackId,
    Danceability,
    Energy,
    Key,
    Loudness,
    Mode,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Tempo,
    TimeSignature,
    DurationMs,
    AnalysisUrl,
    TrackHref,
    Uri,
}
