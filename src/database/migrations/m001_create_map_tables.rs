use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create maps table
        manager
            .create_table(
                Table::create()
                    .table(Maps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Maps::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Maps::Style)
                            .text()
                            .not_null()
                            .default("leaflet"),
                    )
                    .col(
                        ColumnDef::new(Maps::LeafletTileUrl)
                            .text()
                            .not_null()
                            .default("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"),
                    )
                    .col(ColumnDef::new(Maps::Height).integer().not_null().default(400))
                    .col(ColumnDef::new(Maps::Zoom).integer().not_null().default(8))
                    .col(ColumnDef::new(Maps::MapboxAccessToken).text())
                    .col(ColumnDef::new(Maps::MapboxMapId).text())
                    .col(ColumnDef::new(Maps::Street).text())
                    .col(ColumnDef::new(Maps::PostalCode).text().not_null())
                    .col(ColumnDef::new(Maps::City).text().not_null())
                    .col(ColumnDef::new(Maps::Lat).decimal_len(10, 6))
                    .col(ColumnDef::new(Maps::Lng).decimal_len(10, 6))
                    .col(
                        ColumnDef::new(Maps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Maps::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create pins table
        manager
            .create_table(
                Table::create()
                    .table(Pins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pins::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pins::MapId).integer().not_null())
                    .col(ColumnDef::new(Pins::Name).text().not_null())
                    .col(ColumnDef::new(Pins::Street).text())
                    .col(ColumnDef::new(Pins::PostalCode).text().not_null())
                    .col(ColumnDef::new(Pins::City).text().not_null())
                    .col(ColumnDef::new(Pins::Link).text())
                    .col(ColumnDef::new(Pins::LinkTitle).text())
                    .col(ColumnDef::new(Pins::Description).text())
                    .col(
                        ColumnDef::new(Pins::PinColor)
                            .text()
                            .not_null()
                            .default("red"),
                    )
                    .col(ColumnDef::new(Pins::Lat).decimal_len(10, 6))
                    .col(ColumnDef::new(Pins::Lng).decimal_len(10, 6))
                    .col(
                        ColumnDef::new(Pins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pins::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pins_map_id")
                            .from(Pins::Table, Pins::MapId)
                            .to(Maps::Table, Maps::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pins_map_id")
                    .table(Pins::Table)
                    .col(Pins::MapId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pins::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Maps::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Maps {
    Table,
    Id,
    Style,
    LeafletTileUrl,
    Height,
    Zoom,
    MapboxAccessToken,
    MapboxMapId,
    Street,
    PostalCode,
    City,
    Lat,
    Lng,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Pins {
    Table,
    Id,
    MapId,
    Name,
    Street,
    PostalCode,
    City,
    Link,
    LinkTitle,
    Description,
    PinColor,
    Lat,
    Lng,
    CreatedAt,
    UpdatedAt,
}
