use sea_orm_migration::{prelude::*, schema::*};

use super::big_pk_auto;

use super::m20260829_000009_create_sections_table::Section;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SectionItem::Table)
                    .col(big_pk_auto(SectionItem::Id))
                    .col(big_integer(SectionItem::SectionId))
                    .col(string_len(SectionItem::ItemType, 8))
                    .col(string(SectionItem::Name))
                    .col(string(SectionItem::Link))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-section-item-section_id")
                            .from(SectionItem::Table, SectionItem::SectionId)
                            .to(Section::Table, Section::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_section_items_section_id")
                    .table(SectionItem::Table)
                    .col(SectionItem::SectionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SectionItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SectionItem {
    Table,
    Id,
    SectionId,
    ItemType,
    Name,
    Link,
}
